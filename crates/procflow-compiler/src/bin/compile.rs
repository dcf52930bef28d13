// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Process model compiler CLI
//!
//! Compiles process model JSON files into Rust source.
//!
//! Usage:
//!
//! ```text
//! procflow-compile --model <path>... [--output <dir>] [--runtime-crate <path>] [--package <pkg>]
//!                  [--no-validate] [--lenient-variables] [--emit-program]
//! procflow-compile --print-schema
//! ```
//!
//! Example:
//!
//! ```text
//! procflow-compile --model approval.json --model shipping.json --output ./generated
//! ```

use anyhow::Context;
use clap::Parser;
use procflow_compiler::render::definition_path;
use procflow_compiler::{
    CodegenConfig, CompiledDefinition, GeneratedFile, GeneratedFileKind, LoweringRegistry,
    compile_batch, render_batch,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Compile process models into Rust construction code.
#[derive(Debug, Parser)]
#[command(name = "procflow-compile", version, about)]
struct Args {
    /// Model file; holds a single model or an array of models
    #[arg(long = "model", short = 'm', required_unless_present = "print_schema")]
    models: Vec<PathBuf>,

    /// Output directory (prints a summary when omitted)
    #[arg(long, short = 'o', env = "PROCFLOW_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Crate path the generated code imports its factory API from
    #[arg(long)]
    runtime_crate: Option<String>,

    /// Package for models that do not declare one
    #[arg(long)]
    package: Option<String>,

    /// Do not call `validate()` before `build()` in generated code
    #[arg(long)]
    no_validate: bool,

    /// Accept variable references that do not resolve in scope
    #[arg(long)]
    lenient_variables: bool,

    /// Also write each construction program as JSON
    #[arg(long)]
    emit_program: bool,

    /// Print the JSON Schema of the model format and exit
    #[arg(long)]
    print_schema: bool,
}

impl Args {
    /// Environment configuration overridden by command-line flags.
    fn config(&self) -> anyhow::Result<CodegenConfig> {
        let mut config = CodegenConfig::from_env().context("invalid environment configuration")?;
        if let Some(runtime_crate) = &self.runtime_crate {
            config = config.with_runtime_crate(runtime_crate);
        }
        if let Some(package) = &self.package {
            config = config.with_default_package(package);
        }
        if self.no_validate {
            config = config.with_validate_on_build(false);
        }
        if self.lenient_variables {
            config = config.with_check_variable_refs(false);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one model failed to compile or render.
fn run(args: Args) -> anyhow::Result<bool> {
    if args.print_schema {
        let schema = procflow_dsl::schema::generate_model_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(true);
    }

    let config = args.config()?;

    let mut models = Vec::new();
    for path in &args.models {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed = procflow_dsl::parse_models(&json)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!(path = %path.display(), models = parsed.len(), "Loaded model file");
        models.extend(parsed);
    }

    let registry = LoweringRegistry::standard();
    let outcome = compile_batch(&models, &registry, &config);
    for failure in &outcome.failures {
        eprintln!("error: {}", failure);
    }

    let rendered = render_batch(&outcome.definitions, &config)?;
    for failure in &rendered.failures {
        eprintln!("error: {}", failure);
    }
    let files = rendered.files;

    match &args.output {
        Some(dir) => {
            write_files(dir, &files)?;
            if args.emit_program {
                write_programs(dir, &outcome.definitions, &files)?;
            }
        }
        None => {
            for file in &files {
                println!("{:<9} {} {}", file.kind, file.checksum(), file.path.display());
            }
            if args.emit_program {
                println!("{}", serde_json::to_string_pretty(&outcome.definitions)?);
            }
        }
    }

    let failed = outcome.failures.len() + rendered.failures.len();
    eprintln!("{} compiled, {} failed", models.len() - failed, failed);
    Ok(failed == 0)
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn write_files(dir: &Path, files: &[GeneratedFile]) -> anyhow::Result<()> {
    for file in files {
        let path = dir.join(&file.path);
        write_file(&path, &file.contents)?;
        info!(path = %path.display(), checksum = %file.checksum(), "Wrote generated file");
        println!("{}", path.display());
    }
    Ok(())
}

/// Write `<file>.program.json` next to each rendered definition's source.
fn write_programs(
    dir: &Path,
    definitions: &[CompiledDefinition],
    files: &[GeneratedFile],
) -> anyhow::Result<()> {
    for file in files.iter().filter(|f| f.kind == GeneratedFileKind::Source) {
        let Some(definition) = definitions
            .iter()
            .find(|definition| definition_path(definition) == file.path)
        else {
            continue;
        };
        let path = dir.join(file.path.with_extension("program.json"));
        let json = serde_json::to_string_pretty(definition)?;
        write_file(&path, &json)?;
    }
    Ok(())
}
