// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Program assembly and batch compilation.
//!
//! A [`CompiledDefinition`] wraps the construction program of one model
//! with the model's identity and its process-level header (declared
//! variables and metadata). Models are compiled independently: a batch
//! never merges, reorders or cross-references their programs, and one
//! model's failure does not affect the others.

use procflow_dsl::WorkflowModel;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::codegen::driver::GraphCompiler;
use crate::codegen::metadata::{self, Owner};
use crate::codegen::registry::LoweringRegistry;
use crate::codegen::statement::{ConstructionProgram, StatementBlock};
use crate::config::CodegenConfig;
use crate::error::{CodegenError, CompileError, Result};

/// One compiled model, ready for rendering or packaging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledDefinition {
    /// Process id of the source model
    pub model_id: String,
    /// Name of the source model
    pub model_name: String,
    /// Package, either the model's own or the configured default
    pub package_name: String,
    pub version: Option<String>,
    /// Process variable declarations followed by process metadata
    pub header: StatementBlock,
    /// Node and connection statements
    pub program: ConstructionProgram,
}

impl CompiledDefinition {
    /// Total number of statements, header included.
    pub fn statement_count(&self) -> usize {
        self.header.len() + self.program.len()
    }
}

/// Check model-level identity: a non-blank name and id.
fn check_identity(model: &WorkflowModel) -> Result<()> {
    if model.name.trim().is_empty() {
        return Err(CodegenError::EmptyModelName);
    }
    if model.id.trim().is_empty() {
        return Err(CodegenError::MalformedModel {
            field: "id".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Wrap a lowered program with the identity and header of its model.
pub fn assemble(
    model: &WorkflowModel,
    program: ConstructionProgram,
    config: &CodegenConfig,
) -> Result<CompiledDefinition> {
    check_identity(model)?;

    let package_name = match model.package_name.as_deref() {
        Some(package) if package.trim().is_empty() => {
            return Err(CodegenError::MalformedModel {
                field: "packageName".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        Some(package) => package.to_string(),
        None => config.default_package.clone(),
    };

    let mut header = StatementBlock::new();
    metadata::emit_variables(&mut header, Owner::Process, &model.variables)?;
    metadata::emit_metadata(&mut header, Owner::Process, &model.metadata)?;

    Ok(CompiledDefinition {
        model_id: model.id.clone(),
        model_name: model.name.clone(),
        package_name,
        version: model.version.clone(),
        header,
        program,
    })
}

/// Name used to attribute errors: the model name, or its id when unnamed.
fn model_label(model: &WorkflowModel) -> String {
    if !model.name.trim().is_empty() {
        model.name.clone()
    } else if !model.id.trim().is_empty() {
        model.id.clone()
    } else {
        "<unnamed>".to_string()
    }
}

/// Compile one model into a [`CompiledDefinition`].
///
/// Model identity is checked before any node is lowered, so an unnamed
/// model fails with [`CodegenError::EmptyModelName`] without producing any
/// statement.
pub fn compile_model(
    model: &WorkflowModel,
    registry: &LoweringRegistry,
    config: &CodegenConfig,
) -> std::result::Result<CompiledDefinition, CompileError> {
    let attribute = |source| CompileError::new(model_label(model), source);

    check_identity(model).map_err(attribute)?;
    let program = GraphCompiler::new(registry, config)
        .compile(&model.graph, &model.variables)
        .map_err(attribute)?;
    let definition = assemble(model, program, config).map_err(attribute)?;

    info!(
        model_id = %definition.model_id,
        model_name = %definition.model_name,
        package = %definition.package_name,
        nodes = model.graph.nodes.len(),
        statements = definition.statement_count(),
        "Compiled model"
    );
    Ok(definition)
}

/// Result of compiling a batch of models.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully compiled models, in input order
    pub definitions: Vec<CompiledDefinition>,
    /// Failed models, in input order
    pub failures: Vec<CompileError>,
}

impl BatchOutcome {
    /// Returns true if no model failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compile independent models in parallel.
///
/// The registry and configuration are shared read-only by all workers.
/// Definitions and failures keep the relative order of their input models.
pub fn compile_batch(
    models: &[WorkflowModel],
    registry: &LoweringRegistry,
    config: &CodegenConfig,
) -> BatchOutcome {
    let results: Vec<_> = models
        .par_iter()
        .map(|model| compile_model(model, registry, config))
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(definition) => outcome.definitions.push(definition),
            Err(error) => {
                warn!(model = %error.model, error = %error.source, "Model failed to compile");
                outcome.failures.push(error);
            }
        }
    }

    info!(
        models = models.len(),
        compiled = outcome.definitions.len(),
        failed = outcome.failures.len(),
        "Batch compilation finished"
    );
    outcome
}
