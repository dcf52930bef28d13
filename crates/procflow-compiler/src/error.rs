// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for procflow-compiler.
//!
//! Every error is a deterministic structural defect in the input model; none
//! is transient and nothing here is retried.

use procflow_dsl::{NodeId, NodeKind};

/// Result type using CodegenError
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors raised while lowering a single model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum CodegenError {
    /// No lowering routine is registered for the node's variant.
    #[error("no lowering routine registered for {kind} node {node_id}")]
    UnsupportedVariant {
        /// The node that could not be lowered.
        node_id: NodeId,
        /// Its variant tag.
        kind: NodeKind,
    },

    /// A required attribute is missing or invalid.
    #[error("{kind} node {node_id}: field '{field}' {reason}")]
    MalformedNode {
        /// The offending node.
        node_id: NodeId,
        /// Its variant tag.
        kind: NodeKind,
        /// Name of the missing or invalid field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A connection endpoint is not a node of the graph it belongs to.
    #[error("{}connection {from} -> {to} references unknown node {missing}", container_prefix(.container))]
    DanglingConnection {
        /// Connection source id.
        from: NodeId,
        /// Connection target id.
        to: NodeId,
        /// The endpoint that was not found.
        missing: NodeId,
        /// Composite node owning the connection, `None` at process level.
        container: Option<NodeId>,
    },

    /// A text value cannot be rendered as a safe literal.
    #[error("cannot render {location} as a literal: {reason}")]
    LiteralEscapeFailure {
        /// Where the text came from (node and field, or model attribute).
        location: String,
        /// Why it could not be rendered.
        reason: String,
    },

    /// The model has no name.
    #[error("model name must not be empty")]
    EmptyModelName,

    /// Two nodes of one graph share an id.
    #[error("{}node id {node_id} is declared more than once", container_prefix(.container))]
    DuplicateNodeId {
        /// The repeated id.
        node_id: NodeId,
        /// Composite node owning the graph, `None` at process level.
        container: Option<NodeId>,
    },

    /// A model-level attribute is missing or invalid.
    #[error("model field '{field}' {reason}")]
    MalformedModel {
        /// Name of the offending attribute.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The configured runtime crate is not a Rust path.
    #[error("runtime crate '{0}' is not a valid Rust path")]
    InvalidRuntimeCrate(String),
}

fn container_prefix(container: &Option<NodeId>) -> String {
    match container {
        Some(id) => format!("composite node {}: ", id),
        None => String::new(),
    }
}

impl CodegenError {
    /// Build a [`CodegenError::MalformedNode`].
    pub fn malformed(
        node_id: NodeId,
        kind: NodeKind,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CodegenError::MalformedNode {
            node_id,
            kind,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CodegenError::MalformedNode`] for an absent required field.
    pub fn missing(node_id: NodeId, kind: NodeKind, field: impl Into<String>) -> Self {
        Self::malformed(node_id, kind, field, "is required")
    }
}

/// A [`CodegenError`] tagged with the model it was raised for.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("model '{model}': {source}")]
pub struct CompileError {
    /// Model name, or its id when the name is empty.
    pub model: String,
    /// The underlying lowering error.
    #[source]
    pub source: CodegenError,
}

impl CompileError {
    /// Attach model context to a lowering error.
    pub fn new(model: impl Into<String>, source: CodegenError) -> Self {
        Self {
            model: model.into(),
            source,
        }
    }
}
