// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Code generation configuration.
//!
//! The configuration is passed explicitly to the graph driver, the
//! assembler and the renderer; nothing in the codegen path reads ambient
//! global state.

/// Default crate path the generated code imports its factory API from.
pub const DEFAULT_RUNTIME_CRATE: &str = "procflow_runtime";

/// Default package for models that do not declare one.
pub const DEFAULT_PACKAGE: &str = "org.procflow.generated";

/// Options controlling lowering and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Crate path used by generated `use` statements (e.g. `procflow_runtime`).
    /// Only affects rendering.
    pub runtime_crate: String,

    /// Package assigned to models without one. Becomes the `PACKAGE` constant
    /// of the generated definition and the directory of its output file.
    pub default_package: String,

    /// When true, data mappings and node variable names must resolve in the
    /// enclosing variable scope; unresolved names fail with `MalformedNode`.
    pub check_variable_refs: bool,

    /// When true, the generated `definition()` calls `validate()` on the
    /// process before building it.
    pub validate_on_build: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            default_package: DEFAULT_PACKAGE.to_string(),
            check_variable_refs: true,
            validate_on_build: true,
        }
    }
}

impl CodegenConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `PROCFLOW_RUNTIME_CRATE`: runtime crate path (default: procflow_runtime)
    /// - `PROCFLOW_DEFAULT_PACKAGE`: default package (default: org.procflow.generated)
    /// - `PROCFLOW_CHECK_VARIABLE_REFS`: true/false (default: true)
    /// - `PROCFLOW_VALIDATE_ON_BUILD`: true/false (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let runtime_crate = std::env::var("PROCFLOW_RUNTIME_CRATE")
            .unwrap_or(defaults.runtime_crate);
        if !is_crate_path(&runtime_crate) {
            return Err(ConfigError::Invalid(
                "PROCFLOW_RUNTIME_CRATE",
                "must be a `::`-separated Rust path",
            ));
        }

        let default_package = std::env::var("PROCFLOW_DEFAULT_PACKAGE")
            .unwrap_or(defaults.default_package);
        if default_package.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "PROCFLOW_DEFAULT_PACKAGE",
                "must not be empty",
            ));
        }

        let check_variable_refs = env_bool(
            "PROCFLOW_CHECK_VARIABLE_REFS",
            defaults.check_variable_refs,
        )?;
        let validate_on_build =
            env_bool("PROCFLOW_VALIDATE_ON_BUILD", defaults.validate_on_build)?;

        Ok(Self {
            runtime_crate,
            default_package,
            check_variable_refs,
            validate_on_build,
        })
    }

    /// Override the runtime crate path.
    pub fn with_runtime_crate(mut self, runtime_crate: impl Into<String>) -> Self {
        self.runtime_crate = runtime_crate.into();
        self
    }

    /// Override the default package.
    pub fn with_default_package(mut self, package: impl Into<String>) -> Self {
        self.default_package = package.into();
        self
    }

    /// Toggle variable reference checking.
    pub fn with_check_variable_refs(mut self, check: bool) -> Self {
        self.check_variable_refs = check;
        self
    }

    /// Toggle the `validate()` call in generated code.
    pub fn with_validate_on_build(mut self, validate: bool) -> Self {
        self.validate_on_build = validate;
        self
    }
}

fn env_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid(name, "must be true or false")),
        },
        Err(_) => Ok(default),
    }
}

/// Returns true for `ident` or `ident::ident::...`.
pub(crate) fn is_crate_path(path: &str) -> bool {
    !path.is_empty()
        && path.split("::").all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
