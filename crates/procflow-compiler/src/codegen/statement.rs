// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Construction statements and the programs built from them.
//!
//! Statements are append-only: once emitted they are never reordered, and
//! their order is the order the runtime replays them in.

use procflow_dsl::{ConnectionType, DataType, NodeId, NodeKind};
use serde::Serialize;

use super::context::NodeRef;
use super::literal::{EscapedStr, Literal};

/// Direction of a data mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataDirection {
    /// Process variable copied into a node parameter
    In,
    /// Node parameter copied back into a process variable
    Out,
}

/// One construction instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Statement {
    /// Create node `id` of `kind`, inside `parent` when nested.
    BeginNode {
        node: NodeRef,
        parent: Option<NodeRef>,
        id: NodeId,
        kind: NodeKind,
    },
    /// Set the node's display label.
    SetName { node: NodeRef, name: EscapedStr },
    /// Set a variant-specific attribute.
    SetField {
        node: NodeRef,
        field: &'static str,
        value: Literal,
    },
    /// Guard the branch of a split that leads to `target`.
    AddConstraint {
        node: NodeRef,
        target: NodeId,
        expression: EscapedStr,
        dialect: Option<EscapedStr>,
        priority: Option<i32>,
        is_default: bool,
    },
    /// Map a variable onto a node parameter, or back.
    MapData {
        node: NodeRef,
        direction: DataDirection,
        variable: EscapedStr,
        parameter: EscapedStr,
    },
    /// Declare a variable on the process (`owner: None`) or on a composite.
    DeclareVariable {
        owner: Option<NodeRef>,
        name: EscapedStr,
        data_type: DataType,
    },
    /// The node's own construction is finished.
    MarkComplete { node: NodeRef },
    /// Attach one annotation to a node (`node: None` for the process).
    AttachMetadata {
        node: Option<NodeRef>,
        key: EscapedStr,
        value: Literal,
    },
    /// Wire `from` to `to`, inside `container` when nested.
    Connect {
        container: Option<NodeRef>,
        from: NodeId,
        to: NodeId,
        connection_type: Option<ConnectionType>,
    },
}

/// The statements produced for one node, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatementBlock {
    statements: Vec<Statement>,
}

impl StatementBlock {
    /// Empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Append every statement of `other`, keeping its order.
    pub fn append(&mut self, other: StatementBlock) {
        self.statements.extend(other.statements);
    }

    /// Statements in emission order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl IntoIterator for StatementBlock {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// The full, ordered statement sequence for one graph.
///
/// Holds no reference to the graph it was lowered from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConstructionProgram {
    statements: Vec<Statement>,
}

impl ConstructionProgram {
    /// Empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node block at the end of the program.
    pub fn append_block(&mut self, block: StatementBlock) {
        self.statements.extend(block);
    }

    /// Append a single statement at the end of the program.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Statements in playback order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Convert into a block, for embedding a nested program inside a
    /// composite node's block.
    pub fn into_block(self) -> StatementBlock {
        StatementBlock {
            statements: self.statements,
        }
    }
}
