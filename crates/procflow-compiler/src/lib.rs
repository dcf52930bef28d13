// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Procflow Compiler - Process Models to Construction Programs
//!
//! This crate lowers process models (see `procflow-dsl`) into construction
//! programs: ordered statement sequences that, replayed against a runtime's
//! process factory, rebuild the process definition. Programs can then be
//! rendered to Rust source.
//!
//! # Pipeline
//!
//! ```text
//!     ┌─────────────┐      ┌─────────────┐      ┌──────────────┐      ┌─────────────┐
//!     │  Process    │      │   Graph     │      │  Compiled    │      │    Rust     │
//!     │   Model     │─────▶│  Lowering   │─────▶│  Definition  │─────▶│   Source    │
//!     │  (JSON)     │      │  (codegen)  │      │  (assemble)  │      │  (render)   │
//!     └─────────────┘      └─────────────┘      └──────────────┘      └─────────────┘
//! ```
//!
//! 1. **Lower**: each node is lowered by the routine registered for its kind,
//!    in declaration order; connections are checked and wired afterwards
//! 2. **Assemble**: the program is wrapped with the model's identity,
//!    process variables and process metadata
//! 3. **Render**: the definition becomes a Rust module replaying the program
//!
//! Models in a batch are compiled in parallel and independently.
//!
//! # Usage
//!
//! ```ignore
//! use procflow_compiler::{CodegenConfig, LoweringRegistry, compile_batch, render_definition};
//!
//! let models = procflow_dsl::parse_models(&json)?;
//! let config = CodegenConfig::from_env()?;
//! let outcome = compile_batch(&models, &LoweringRegistry::standard(), &config);
//! for definition in &outcome.definitions {
//!     let file = render_definition(definition, &config)?;
//!     println!("{}", file.path.display());
//! }
//! ```
//!
//! # Modules
//!
//! - [`codegen`]: lowering of graphs into construction programs
//! - [`assemble`]: compiled definitions and batch compilation
//! - [`render`]: Rust source rendering
//! - [`config`]: codegen options
//! - [`error`]: error types

/// Compiled definitions and batch compilation.
pub mod assemble;

/// Lowering of process graphs into construction programs.
pub mod codegen;

/// Codegen options.
pub mod config;

/// Error types.
pub mod error;

/// Rust source rendering.
pub mod render;

pub use assemble::{BatchOutcome, CompiledDefinition, assemble, compile_batch, compile_model};
pub use codegen::{ConstructionProgram, GraphCompiler, LoweringRegistry, Statement, StatementBlock};
pub use config::{CodegenConfig, ConfigError};
pub use error::{CodegenError, CompileError};
pub use render::{
    GeneratedFile, GeneratedFileKind, RenderOutcome, render_batch, render_container,
    render_definition,
};
