// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rust source rendering for compiled definitions.
//!
//! Turns a [`CompiledDefinition`] into a Rust module whose `definition()`
//! function replays the header and the construction program, statement by
//! statement, against the runtime crate's process factory:
//!
//! ```text
//! let mut process = procflow_runtime::ProcessFactory::new(Self::ID, Self::NAME, Self::PACKAGE);
//! let mut node_7 = process.milestone_node(7u64);
//! node_7.name("Gate");
//! node_7.constraint("age >= 18");
//! node_7.done();
//! process.connection(1u64, 7u64);
//! ```
//!
//! Rendering is pure: the caller decides where the returned files go.

use proc_macro2::{Ident, Literal as TokenLiteral, Span, TokenStream};
use procflow_dsl::{ConnectionType, DataType};
use quote::quote;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::assemble::CompiledDefinition;
use crate::codegen::context::{NodeRef, sanitize_ident};
use crate::codegen::literal::{EscapedStr, Literal, LiteralEscapeError, escape};
use crate::codegen::statement::{DataDirection, Statement};
use crate::config::{CodegenConfig, is_crate_path};
use crate::error::{CodegenError, CompileError, Result};

/// File name of the container module.
pub const CONTAINER_FILE: &str = "definitions.rs";

const GENERATED_HEADER: &str = "// @generated by procflow-compile. Do not edit.\n";

/// What a generated file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum GeneratedFileKind {
    /// One process definition
    Source,
    /// Module listing every definition of a batch
    Container,
}

/// A rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub kind: GeneratedFileKind,
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    /// SHA-256 of the contents, lowercase hex.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.contents.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Returns true for UpperCamelCase ASCII names without consecutive
/// capitals (`OrderApproval`, `Step2Review`).
///
/// Such names map one-to-one onto their snake_case module names. Any other
/// name gets a digest suffix so that distinct names never share a module,
/// a file or a struct.
fn is_camel_case(model_name: &str) -> bool {
    let bytes = model_name.as_bytes();
    bytes.first().is_some_and(u8::is_ascii_uppercase)
        && bytes.iter().all(u8::is_ascii_alphanumeric)
        && !bytes
            .windows(2)
            .any(|pair| pair[0].is_ascii_uppercase() && pair[1].is_ascii_uppercase())
}

/// Ten decimal digits derived from the SHA-256 of `model_name`.
///
/// Always starts with a digit, which no word of an UpperCamelCase name does.
fn name_digest(model_name: &str) -> String {
    let hash = Sha256::digest(model_name.as_bytes());
    let value = u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]);
    format!("{:010}", value)
}

/// Words of a name for display: ASCII alphanumeric runs, split at
/// lower-to-upper case changes.
fn words(model_name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in model_name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Struct name of a definition: `OrderApproval` becomes
/// `OrderApprovalProcess`; other names carry their digest, e.g.
/// `order approval` becomes `OrderApprovalProcess1234567890`.
pub fn type_name(model_name: &str) -> String {
    let mut name = String::with_capacity(model_name.len() + 17);
    for word in words(model_name) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.extend(chars);
        }
    }
    name.push_str("Process");
    if !is_camel_case(model_name) {
        name.push_str(&name_digest(model_name));
    }
    sanitize_ident(&name)
}

/// Module (and file stem) of a definition: `OrderApproval` becomes
/// `order_approval_process`; other names carry their digest, e.g.
/// `order approval` becomes `order_approval_process_1234567890`.
pub fn module_name(model_name: &str) -> String {
    let mut name = String::with_capacity(model_name.len() + 19);
    for word in words(model_name) {
        name.push_str(&word.to_ascii_lowercase());
        name.push('_');
    }
    name.push_str("process");
    if !is_camel_case(model_name) {
        name.push('_');
        name.push_str(&name_digest(model_name));
    }
    sanitize_ident(&name)
}

/// Output path of a definition: package segments become directories.
pub fn definition_path(definition: &CompiledDefinition) -> PathBuf {
    let mut path: PathBuf = definition
        .package_name
        .split('.')
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| sanitize_ident(&segment.to_ascii_lowercase()))
        .collect();
    path.push(format!("{}.rs", module_name(&definition.model_name)));
    path
}

fn runtime_path(config: &CodegenConfig) -> Result<TokenStream> {
    if !is_crate_path(&config.runtime_crate) {
        return Err(CodegenError::InvalidRuntimeCrate(config.runtime_crate.clone()));
    }
    TokenStream::from_str(&config.runtime_crate)
        .map_err(|_| CodegenError::InvalidRuntimeCrate(config.runtime_crate.clone()))
}

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

fn render_failure(location: &str, error: LiteralEscapeError) -> CodegenError {
    CodegenError::LiteralEscapeFailure {
        location: location.to_string(),
        reason: error.reason,
    }
}

/// Lex an escaped literal back into tokens.
fn lex(text: &EscapedStr, location: &str) -> Result<TokenStream> {
    text.to_tokens().map_err(|e| render_failure(location, e))
}

/// Escape and lex model-level text.
fn text_tokens(text: &str, location: &str) -> Result<TokenStream> {
    let escaped = escape(text).map_err(|e| render_failure(location, e))?;
    lex(&escaped, location)
}

fn literal_tokens(value: &Literal, rt: &TokenStream, location: &str) -> Result<TokenStream> {
    Ok(match value {
        Literal::Str(text) => lex(text, location)?,
        Literal::Int(i) => {
            let lit = TokenLiteral::i64_suffixed(*i);
            quote! { #lit }
        }
        Literal::UInt(u) => {
            let lit = TokenLiteral::u64_suffixed(*u);
            quote! { #lit }
        }
        Literal::Float(f) => {
            if !f.is_finite() {
                return Err(CodegenError::LiteralEscapeFailure {
                    location: location.to_string(),
                    reason: format!("{} is not a finite number", f),
                });
            }
            let lit = TokenLiteral::f64_suffixed(*f);
            quote! { #lit }
        }
        Literal::Bool(b) => quote! { #b },
        Literal::Null => quote! { #rt::Value::Null },
        Literal::Json(json) => {
            let json = lex(json, location)?;
            quote! { #rt::Value::json(#json) }
        }
        Literal::Variant { ty, variant } => {
            let ty = ident(ty);
            let variant = ident(variant);
            quote! { #rt::#ty::#variant }
        }
    })
}

fn data_type_tokens(data_type: &DataType, rt: &TokenStream, location: &str) -> Result<TokenStream> {
    Ok(match data_type {
        DataType::Object { type_name } => {
            let type_name = text_tokens(type_name, location)?;
            quote! { #rt::DataType::object(#type_name) }
        }
        other => {
            let variant = ident(other.as_str());
            quote! { #rt::DataType::#variant }
        }
    })
}

fn connection_type_tokens(connection_type: ConnectionType, rt: &TokenStream) -> TokenStream {
    let variant = ident(&connection_type.to_string());
    quote! { #rt::ConnectionType::#variant }
}

/// Receiver of a process-or-node statement.
fn receiver(node: Option<&NodeRef>) -> Ident {
    match node {
        Some(node) => node.ident(),
        None => ident("process"),
    }
}

fn id_tokens(id: u64) -> TokenLiteral {
    TokenLiteral::u64_suffixed(id)
}

/// Render one statement as a Rust statement.
fn render_statement(statement: &Statement, rt: &TokenStream) -> Result<TokenStream> {
    Ok(match statement {
        Statement::BeginNode {
            node,
            parent,
            id,
            kind,
        } => {
            let var = node.ident();
            let owner = receiver(parent.as_ref());
            let factory = ident(kind.factory_method());
            let id = id_tokens(*id);
            quote! { let mut #var = #owner.#factory(#id); }
        }
        Statement::SetName { node, name } => {
            let var = node.ident();
            let name = lex(name, node.as_str())?;
            quote! { #var.name(#name); }
        }
        Statement::SetField { node, field, value } => {
            let var = node.ident();
            let setter = ident(field);
            let value = literal_tokens(value, rt, node.as_str())?;
            quote! { #var.#setter(#value); }
        }
        Statement::AddConstraint {
            node,
            target,
            expression,
            dialect,
            priority,
            is_default,
        } => {
            let var = node.ident();
            let target = id_tokens(*target);
            let expression = lex(expression, node.as_str())?;
            let dialect = match dialect {
                Some(dialect) => {
                    let dialect = lex(dialect, node.as_str())?;
                    quote! { Some(#dialect) }
                }
                None => quote! { None },
            };
            let priority = match priority {
                Some(priority) => {
                    let priority = TokenLiteral::i32_suffixed(*priority);
                    quote! { Some(#priority) }
                }
                None => quote! { None },
            };
            quote! {
                #var.branch_constraint(#target, #expression, #dialect, #priority, #is_default);
            }
        }
        Statement::MapData {
            node,
            direction,
            variable,
            parameter,
        } => {
            let var = node.ident();
            let method = match direction {
                DataDirection::In => ident("in_mapping"),
                DataDirection::Out => ident("out_mapping"),
            };
            let variable = lex(variable, node.as_str())?;
            let parameter = lex(parameter, node.as_str())?;
            quote! { #var.#method(#variable, #parameter); }
        }
        Statement::DeclareVariable {
            owner,
            name,
            data_type,
        } => {
            let location = owner.as_ref().map_or("process", NodeRef::as_str);
            let var = receiver(owner.as_ref());
            let name = lex(name, location)?;
            let data_type = data_type_tokens(data_type, rt, location)?;
            quote! { #var.variable(#name, #data_type); }
        }
        Statement::MarkComplete { node } => {
            let var = node.ident();
            quote! { #var.done(); }
        }
        Statement::AttachMetadata { node, key, value } => {
            let location = node.as_ref().map_or("process", NodeRef::as_str);
            let var = receiver(node.as_ref());
            let key = lex(key, location)?;
            let value = literal_tokens(value, rt, location)?;
            quote! { #var.metadata(#key, #value); }
        }
        Statement::Connect {
            container,
            from,
            to,
            connection_type,
        } => {
            let var = receiver(container.as_ref());
            let from = id_tokens(*from);
            let to = id_tokens(*to);
            match connection_type {
                Some(connection_type) => {
                    let connection_type = connection_type_tokens(*connection_type, rt);
                    quote! { #var.typed_connection(#from, #to, #connection_type); }
                }
                None => quote! { #var.connection(#from, #to); },
            }
        }
    })
}

/// Render one compiled definition as a Rust module.
pub fn render_definition(
    definition: &CompiledDefinition,
    config: &CodegenConfig,
) -> Result<GeneratedFile> {
    let rt = runtime_path(config)?;
    let struct_ident = ident(&type_name(&definition.model_name));

    let id = text_tokens(&definition.model_id, "model id")?;
    let name = text_tokens(&definition.model_name, "model name")?;
    let package = text_tokens(&definition.package_name, "model package")?;
    let version = match definition.version.as_deref() {
        Some(version) => {
            let version = text_tokens(version, "model version")?;
            quote! { Some(#version) }
        }
        None => quote! { None },
    };

    let statements = definition
        .header
        .statements()
        .iter()
        .chain(definition.program.statements())
        .map(|statement| render_statement(statement, &rt))
        .collect::<Result<Vec<_>>>()?;
    let statement_count = statements.len();

    let validate = if config.validate_on_build {
        quote! { process.validate()?; }
    } else {
        quote! {}
    };

    let tokens = quote! {
        #![allow(unused_mut)]

        /// Construction of a process definition.
        pub struct #struct_ident;

        impl #struct_ident {
            pub const ID: &'static str = #id;
            pub const NAME: &'static str = #name;
            pub const PACKAGE: &'static str = #package;
            pub const VERSION: Option<&'static str> = #version;

            /// Build the runtime definition of this process.
            pub fn definition() -> Result<#rt::ProcessDefinition, #rt::BuildError> {
                let mut process = #rt::ProcessFactory::new(Self::ID, Self::NAME, Self::PACKAGE);
                if let Some(version) = Self::VERSION {
                    process.version(version);
                }
                #(#statements)*
                #validate
                process.build()
            }
        }
    };

    let path = definition_path(definition);
    debug!(
        model_id = %definition.model_id,
        path = %path.display(),
        statements = statement_count,
        "Rendered definition"
    );
    Ok(GeneratedFile {
        kind: GeneratedFileKind::Source,
        path,
        contents: format!("{}{}\n", GENERATED_HEADER, tokens),
    })
}

/// Module under which the container mounts the file at `path`.
fn container_module(path: &Path) -> String {
    sanitize_ident(
        &path
            .with_extension("")
            .iter()
            .map(|segment| segment.to_string_lossy())
            .collect::<Vec<_>>()
            .join("_"),
    )
}

fn collision(
    definition: &CompiledDefinition,
    other: &CompiledDefinition,
    output: &str,
) -> CodegenError {
    CodegenError::MalformedModel {
        field: "name".to_string(),
        reason: format!(
            "'{}' in package '{}' renders to '{}', already used by '{}' in package '{}'",
            definition.model_name,
            definition.package_name,
            output,
            other.model_name,
            other.package_name
        ),
    }
}

/// Render the container module listing `definitions` in the given order.
///
/// Each definition is mounted by path under a module named after its package
/// and model. Two definitions mapping to the same module are rejected; use
/// [`render_batch`] to drop such definitions one by one instead.
pub fn render_container(
    definitions: &[CompiledDefinition],
    config: &CodegenConfig,
) -> Result<GeneratedFile> {
    let rt = runtime_path(config)?;

    let mut seen: HashMap<String, &CompiledDefinition> =
        HashMap::with_capacity(definitions.len());
    let mut modules = Vec::with_capacity(definitions.len());
    let mut builders = Vec::with_capacity(definitions.len());
    let mut ids = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let path = definition_path(definition);
        let mod_name = container_module(&path);
        if let Some(other) = seen.insert(mod_name.clone(), definition) {
            return Err(collision(definition, other, &mod_name));
        }

        let mod_ident = ident(&mod_name);
        let struct_ident = ident(&type_name(&definition.model_name));
        let path_lit = TokenLiteral::string(&path.to_string_lossy().replace('\\', "/"));
        modules.push(quote! {
            #[path = #path_lit]
            pub mod #mod_ident;
        });
        builders.push(quote! { #mod_ident::#struct_ident::definition() });
        ids.push(text_tokens(&definition.model_id, "model id")?);
    }

    let tokens = quote! {
        #(#modules)*

        /// Process ids of every definition, in generation order.
        pub const PROCESS_IDS: &[&str] = &[#(#ids),*];

        /// Build every definition, in generation order.
        pub fn definitions() -> Vec<Result<#rt::ProcessDefinition, #rt::BuildError>> {
            vec![#(#builders),*]
        }
    };

    Ok(GeneratedFile {
        kind: GeneratedFileKind::Container,
        path: PathBuf::from(CONTAINER_FILE),
        contents: format!("{}{}\n", GENERATED_HEADER, tokens),
    })
}

/// Files rendered for a batch, plus the definitions that could not be
/// rendered.
#[derive(Debug, Default)]
pub struct RenderOutcome {
    /// One source per rendered definition, then the container
    pub files: Vec<GeneratedFile>,
    /// Definitions left out, in input order
    pub failures: Vec<CompileError>,
}

/// Render every definition and a container over the ones that rendered.
///
/// A definition whose output file or module is already taken by an earlier
/// definition, or that fails to render, becomes a failure naming its model;
/// the others are still rendered. Only an invalid runtime crate fails the
/// whole batch.
pub fn render_batch(
    definitions: &[CompiledDefinition],
    config: &CodegenConfig,
) -> Result<RenderOutcome> {
    runtime_path(config)?;

    let mut outcome = RenderOutcome::default();
    let mut rendered = Vec::with_capacity(definitions.len());
    let mut paths: HashMap<PathBuf, &CompiledDefinition> = HashMap::new();
    let mut modules: HashMap<String, &CompiledDefinition> = HashMap::new();

    for definition in definitions {
        let path = definition_path(definition);
        let module = container_module(&path);
        let taken = match (paths.get(&path), modules.get(&module)) {
            (Some(other), _) => Some(collision(definition, other, &path.to_string_lossy())),
            (None, Some(other)) => Some(collision(definition, other, &module)),
            (None, None) => None,
        };
        let result = match taken {
            Some(error) => Err(error),
            None => render_definition(definition, config),
        };
        match result {
            Ok(file) => {
                paths.insert(path, definition);
                modules.insert(module, definition);
                outcome.files.push(file);
                rendered.push(definition.clone());
            }
            Err(error) => {
                warn!(model = %definition.model_name, error = %error, "Definition not rendered");
                outcome
                    .failures
                    .push(CompileError::new(definition.model_name.clone(), error));
            }
        }
    }

    if !rendered.is_empty() {
        outcome.files.push(render_container(&rendered, config)?);
    }
    Ok(outcome)
}
