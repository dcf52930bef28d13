// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Metadata and variable-scope emission.
//!
//! Shared by every node routine and by the assembler: emits annotations in
//! their insertion order and variable declarations in declaration order.

use procflow_dsl::{MetadataEntry, NodeId, NodeKind, VariableScope};
use std::collections::HashSet;

use super::context::NodeRef;
use super::literal::{EscapedStr, Literal, escape};
use super::statement::{Statement, StatementBlock};
use crate::error::{CodegenError, Result};

/// Who a metadata mapping or variable scope belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'a> {
    /// The process itself
    Process,
    /// A node of the graph
    Node {
        node: &'a NodeRef,
        id: NodeId,
        kind: NodeKind,
    },
}

impl Owner<'_> {
    fn node_ref(&self) -> Option<NodeRef> {
        match self {
            Owner::Process => None,
            Owner::Node { node, .. } => Some((*node).clone()),
        }
    }

    /// Error for an invalid value of `field` on this owner.
    fn malformed(&self, field: &str, reason: String) -> CodegenError {
        match self {
            Owner::Process => CodegenError::MalformedModel {
                field: field.to_string(),
                reason,
            },
            Owner::Node { id, kind, .. } => CodegenError::malformed(*id, *kind, field, reason),
        }
    }

    fn location(&self, field: &str) -> String {
        match self {
            Owner::Process => format!("model field '{}'", field),
            Owner::Node { id, kind, .. } => format!("{} node {} field '{}'", kind, id, field),
        }
    }
}

/// Escape a text attribute of a node, attributing failures to the node.
pub fn escape_field(id: NodeId, kind: NodeKind, field: &str, text: &str) -> Result<EscapedStr> {
    escape(text).map_err(|e| CodegenError::LiteralEscapeFailure {
        location: format!("{} node {} field '{}'", kind, id, field),
        reason: e.reason,
    })
}

fn escape_for(owner: Owner<'_>, field: &str, text: &str) -> Result<EscapedStr> {
    escape(text).map_err(|e| CodegenError::LiteralEscapeFailure {
        location: owner.location(field),
        reason: e.reason,
    })
}

/// Append one `AttachMetadata` statement per entry, in insertion order.
///
/// Keys must be unique; a repeated key is rejected rather than silently
/// resolved.
pub fn emit_metadata(
    block: &mut StatementBlock,
    owner: Owner<'_>,
    metadata: &[MetadataEntry],
) -> Result<()> {
    let mut seen = HashSet::with_capacity(metadata.len());
    for entry in metadata {
        if !seen.insert(entry.key.as_str()) {
            return Err(owner.malformed(
                "metadata",
                format!("repeats key '{}'", entry.key),
            ));
        }
        let key = escape_for(owner, "metadata", &entry.key)?;
        let value = Literal::from_json(&entry.value).map_err(|e| {
            CodegenError::LiteralEscapeFailure {
                location: owner.location(&format!("metadata.{}", entry.key)),
                reason: e.reason,
            }
        })?;
        block.push(Statement::AttachMetadata {
            node: owner.node_ref(),
            key,
            value,
        });
    }
    Ok(())
}

/// Append one `DeclareVariable` statement per variable, in declaration order.
pub fn emit_variables(
    block: &mut StatementBlock,
    owner: Owner<'_>,
    scope: &VariableScope,
) -> Result<()> {
    if let Some(name) = scope.first_duplicate() {
        return Err(owner.malformed("variables", format!("declares '{}' more than once", name)));
    }
    for variable in scope.iter() {
        if variable.name.trim().is_empty() {
            return Err(owner.malformed("variables", "contains an unnamed variable".to_string()));
        }
        block.push(Statement::DeclareVariable {
            owner: owner.node_ref(),
            name: escape_for(owner, "variables", &variable.name)?,
            data_type: variable.data_type.clone(),
        });
    }
    Ok(())
}
