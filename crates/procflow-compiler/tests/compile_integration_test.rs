// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Integration tests for model compilation and rendering.
//!
//! These tests compile process models from JSON files in the tests/fixtures
//! directory.

use procflow_compiler::codegen::{DataDirection, NodeRef, escape};
use procflow_compiler::{
    CodegenConfig, CodegenError, CompiledDefinition, GeneratedFileKind, LoweringRegistry,
    Statement, compile_batch, compile_model, render_batch, render_container, render_definition,
};
use procflow_dsl::{NodeKind, WorkflowModel};
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_models(filename: &str) -> Vec<WorkflowModel> {
    let path = fixtures_dir().join(filename);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    procflow_dsl::parse_models(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn load_model(filename: &str) -> WorkflowModel {
    let mut models = load_models(filename);
    assert_eq!(models.len(), 1, "{} should hold one model", filename);
    models.remove(0)
}

fn compile(model: &WorkflowModel) -> Result<CompiledDefinition, procflow_compiler::CompileError> {
    compile_model(model, &LoweringRegistry::standard(), &CodegenConfig::default())
}

fn text(value: &str) -> procflow_compiler::codegen::Literal {
    procflow_compiler::codegen::Literal::Str(escape(value).unwrap())
}

// ============================================================================
// Milestone Scenarios
// ============================================================================

#[test]
fn test_single_milestone_program() {
    let definition = compile(&load_model("milestone_gate.json")).unwrap();
    let node = NodeRef::top_level(7);

    assert!(definition.header.is_empty());
    assert_eq!(
        definition.program.statements(),
        &[
            Statement::BeginNode {
                node: node.clone(),
                parent: None,
                id: 7,
                kind: NodeKind::Milestone,
            },
            Statement::SetName {
                node: node.clone(),
                name: escape("Gate").unwrap(),
            },
            Statement::SetField {
                node: node.clone(),
                field: "constraint",
                value: text("age >= 18"),
            },
            Statement::SetField {
                node: node.clone(),
                field: "match_variable",
                value: text("age"),
            },
            Statement::MarkComplete { node },
        ]
    );
}

#[test]
fn test_milestone_without_match_variable() {
    let full = compile(&load_model("milestone_gate.json")).unwrap();

    let mut model = load_model("milestone_gate.json");
    let procflow_dsl::Node::Milestone(milestone) = &mut model.graph.nodes[0] else {
        panic!("fixture should hold a milestone");
    };
    milestone.match_variable = None;
    let reduced = compile(&model).unwrap();

    let expected: Vec<&Statement> = full
        .program
        .statements()
        .iter()
        .filter(|s| !matches!(s, Statement::SetField { field: "match_variable", .. }))
        .collect();
    let actual: Vec<&Statement> = reduced.program.statements().iter().collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_empty_model_name_fails_before_lowering() {
    let mut model = load_model("milestone_gate.json");
    model.name = String::new();

    let err = compile(&model).unwrap_err();
    assert_eq!(err.source, CodegenError::EmptyModelName);
    assert_eq!(err.model, "com.acme.gate");
}

// ============================================================================
// Full Model
// ============================================================================

#[test]
fn test_order_approval_compiles() {
    let definition = compile(&load_model("order_approval.json")).unwrap();

    assert_eq!(definition.model_name, "OrderApproval");
    assert_eq!(definition.package_name, "com.acme.orders");
    assert_eq!(definition.version.as_deref(), Some("2.1"));

    // Four process variables, then two process metadata entries
    let header = definition.header.statements();
    assert_eq!(header.len(), 6);
    assert!(
        header[..4]
            .iter()
            .all(|s| matches!(s, Statement::DeclareVariable { owner: None, .. }))
    );
    assert!(
        header[4..]
            .iter()
            .all(|s| matches!(s, Statement::AttachMetadata { node: None, .. }))
    );
}

#[test]
fn test_order_approval_covers_every_node_kind() {
    let definition = compile(&load_model("order_approval.json")).unwrap();

    let mut kinds: Vec<NodeKind> = definition
        .program
        .statements()
        .iter()
        .filter_map(|s| match s {
            Statement::BeginNode { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds.len(), 16);
    kinds.sort();
    kinds.dedup();
    assert_eq!(kinds.len(), 14);
}

#[test]
fn test_top_level_nodes_in_declaration_order() {
    let definition = compile(&load_model("order_approval.json")).unwrap();

    let top_level: Vec<u64> = definition
        .program
        .statements()
        .iter()
        .filter_map(|s| match s {
            Statement::BeginNode {
                id, parent: None, ..
            } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(top_level, vec![1, 2, 3, 4, 5, 7, 6, 8, 9, 10, 11]);
}

#[test]
fn test_node_metadata_keeps_insertion_order() {
    let definition = compile(&load_model("order_approval.json")).unwrap();
    let task = NodeRef::top_level(2);

    let keys: Vec<&str> = definition
        .program
        .statements()
        .iter()
        .filter_map(|s| match s {
            Statement::AttachMetadata {
                node: Some(node),
                key,
                ..
            } if *node == task => Some(key.as_source()),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["\"form\"", "\"escalate\"", "\"retries\""]);
}

#[test]
fn test_composite_nests_its_graph() {
    let definition = compile(&load_model("order_approval.json")).unwrap();
    let statements = definition.program.statements();
    let composite = NodeRef::top_level(8);

    let begin = statements
        .iter()
        .position(|s| matches!(s, Statement::BeginNode { id: 8, parent: None, .. }))
        .unwrap();
    let complete = statements
        .iter()
        .position(|s| matches!(s, Statement::MarkComplete { node } if *node == composite))
        .unwrap();

    let nested = &statements[begin + 1..complete];
    let nested_refs: Vec<&str> = nested
        .iter()
        .filter_map(|s| match s {
            Statement::BeginNode {
                node,
                parent: Some(parent),
                ..
            } if *parent == composite => Some(node.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        nested_refs,
        vec!["node_8_1", "node_8_2", "node_8_3", "node_8_4", "node_8_5"]
    );

    let nested_connections = nested
        .iter()
        .filter(|s| matches!(s, Statement::Connect { container: Some(c), .. } if *c == composite))
        .count();
    assert_eq!(nested_connections, 4);

    // Nested mapping resolves the composite's local variable
    assert!(nested.iter().any(|s| matches!(
        s,
        Statement::MapData {
            direction: DataDirection::Out,
            ..
        }
    )));
}

#[test]
fn test_connections_follow_all_nodes() {
    let definition = compile(&load_model("order_approval.json")).unwrap();
    let statements = definition.program.statements();

    let top_level_connections: Vec<(u64, u64)> = statements
        .iter()
        .filter_map(|s| match s {
            Statement::Connect {
                container: None,
                from,
                to,
                ..
            } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(top_level_connections.len(), 10);
    assert_eq!(top_level_connections[0], (1, 2));
    assert_eq!(top_level_connections[9], (10, 11));

    let first_connect = statements
        .iter()
        .position(|s| matches!(s, Statement::Connect { container: None, .. }))
        .unwrap();
    assert_eq!(
        statements.len() - first_connect,
        10,
        "top-level connections should close the program"
    );
}

#[test]
fn test_compilation_is_deterministic() {
    let model = load_model("order_approval.json");
    let first = compile(&model).unwrap();
    let second = compile(&model).unwrap();
    assert_eq!(first, second);

    let config = CodegenConfig::default();
    let first = render_definition(&first, &config).unwrap();
    let second = render_definition(&second, &config).unwrap();
    assert_eq!(first.contents, second.contents);
}

// ============================================================================
// Connection Errors
// ============================================================================

#[test]
fn test_dangling_connection_fixture() {
    let err = compile(&load_model("dangling_connection.json")).unwrap_err();
    assert_eq!(err.model, "Broken");
    assert_eq!(
        err.source,
        CodegenError::DanglingConnection {
            from: 2,
            to: 99,
            missing: 99,
            container: None,
        }
    );
}

#[test]
fn test_backward_connection_compiles() {
    // Third declares End(2) before Start(1) and connects 1 -> 2
    let models = load_models("batch.json");
    let third = models.iter().find(|m| m.name == "Third").unwrap();
    let definition = compile(third).unwrap();
    assert!(matches!(
        definition.program.statements().last(),
        Some(Statement::Connect { from: 1, to: 2, .. })
    ));
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_batch_isolates_failures() {
    let models = load_models("batch.json");
    let outcome = compile_batch(&models, &LoweringRegistry::standard(), &CodegenConfig::default());

    let compiled: Vec<&str> = outcome
        .definitions
        .iter()
        .map(|d| d.model_name.as_str())
        .collect();
    assert_eq!(compiled, vec!["First", "Third"]);

    let failed: Vec<&str> = outcome.failures.iter().map(|f| f.model.as_str()).collect();
    assert_eq!(failed, vec!["com.acme.unnamed", "Undeclared"]);
    assert_eq!(outcome.failures[0].source, CodegenError::EmptyModelName);
    assert!(matches!(
        outcome.failures[1].source,
        CodegenError::MalformedNode { node_id: 1, .. }
    ));
}

#[test]
fn test_lenient_variables_accepts_undeclared_names() {
    let models = load_models("batch.json");
    let config = CodegenConfig::default().with_check_variable_refs(false);
    let outcome = compile_batch(&models, &LoweringRegistry::standard(), &config);

    assert_eq!(outcome.definitions.len(), 3);
    assert_eq!(outcome.failures.len(), 1);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_rendered_sources_parse() {
    let config = CodegenConfig::default();
    let mut definitions = vec![compile(&load_model("order_approval.json")).unwrap()];
    definitions.push(compile(&load_model("milestone_gate.json")).unwrap());

    for definition in &definitions {
        let file = render_definition(definition, &config).unwrap();
        assert_eq!(file.kind, GeneratedFileKind::Source);
        syn::parse_file(&file.contents)
            .unwrap_or_else(|e| panic!("{} does not parse: {}", file.path.display(), e));
    }

    let container = render_container(&definitions, &config).unwrap();
    assert_eq!(container.kind, GeneratedFileKind::Container);
    syn::parse_file(&container.contents).unwrap();
}

#[test]
fn test_batch_renders_every_compiled_model() {
    let mut models = load_models("batch.json");
    // Same name as "First" up to spacing
    let mut spaced = models[0].clone();
    spaced.id = "com.acme.spaced".to_string();
    spaced.name = "Fir st".to_string();
    models.push(spaced);

    let config = CodegenConfig::default();
    let outcome = compile_batch(&models, &LoweringRegistry::standard(), &config);
    assert_eq!(outcome.definitions.len(), 3);

    let rendered = render_batch(&outcome.definitions, &config).unwrap();
    assert!(rendered.failures.is_empty());
    let sources = rendered
        .files
        .iter()
        .filter(|f| f.kind == GeneratedFileKind::Source)
        .count();
    assert_eq!(sources, 3);
    assert_eq!(
        rendered.files.last().map(|f| f.kind),
        Some(GeneratedFileKind::Container)
    );
}

#[test]
fn test_rendered_paths() {
    let config = CodegenConfig::default().with_default_package("org.example");
    let approval = compile_model(
        &load_model("order_approval.json"),
        &LoweringRegistry::standard(),
        &config,
    )
    .unwrap();
    let gate = compile_model(
        &load_model("milestone_gate.json"),
        &LoweringRegistry::standard(),
        &config,
    )
    .unwrap();

    assert_eq!(
        render_definition(&approval, &config).unwrap().path,
        PathBuf::from("com/acme/orders/order_approval_process.rs")
    );
    assert_eq!(
        render_definition(&gate, &config).unwrap().path,
        PathBuf::from("org/example/adult_gate_process.rs")
    );
}

#[test]
fn test_rendered_script_is_escaped() {
    let definition = compile(&load_model("order_approval.json")).unwrap();
    let file = render_definition(&definition, &CodegenConfig::default()).unwrap();

    let parsed = syn::parse_file(&file.contents).unwrap();
    let mut strings = Vec::new();
    collect_strings(&quote::quote!(#parsed), &mut strings);
    assert!(strings.contains(&"inventory.reserve(order);\nlog(\"reserved\");".to_string()));
}

fn collect_strings(tokens: &proc_macro2::TokenStream, out: &mut Vec<String>) {
    for tree in tokens.clone() {
        match tree {
            proc_macro2::TokenTree::Group(group) => collect_strings(&group.stream(), out),
            proc_macro2::TokenTree::Literal(lit) => {
                if let Ok(s) = syn::parse_str::<syn::LitStr>(&lit.to_string()) {
                    out.push(s.value());
                }
            }
            _ => {}
        }
    }
}
