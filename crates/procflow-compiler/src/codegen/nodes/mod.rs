// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Node lowering routines.
//!
//! Each node variant has its own routine that produces the statement block
//! for one node. Every block has the same shape:
//!
//! 1. `BeginNode` with the node's ref, id and kind
//! 2. `SetName` when the node has a name
//! 3. required fields
//! 4. optional fields that are present (absent ones emit nothing)
//! 5. `MarkComplete`
//! 6. metadata, in insertion order
//!
//! Variant-specific statements (constraints, data mappings, nested nodes)
//! sit between steps 4 and 5.

pub mod action;
pub mod boundary_event;
pub mod composite;
pub mod end;
pub mod event;
pub mod fault;
pub mod human_task;
pub mod join;
pub mod milestone;
pub mod rule_set;
pub mod split;
pub mod start;
pub mod sub_process;
pub mod timer;

use procflow_dsl::{DataMapping, DataType, NodeBase, NodeId, NodeKind, Variable};

use super::context::{LoweringContext, NodeRef};
use super::literal::{EscapedStr, Literal};
use super::metadata::{self, Owner, escape_field};
use super::statement::{DataDirection, Statement, StatementBlock};
use crate::error::{CodegenError, Result};

/// Accumulates the block of a single node.
///
/// Owned by one routine invocation and consumed by [`NodeEmitter::finish`];
/// nothing outside the routine can observe a partially built block.
pub struct NodeEmitter<'c, 'a> {
    cx: &'c LoweringContext<'a>,
    node: NodeRef,
    id: NodeId,
    kind: NodeKind,
    block: StatementBlock,
}

impl<'c, 'a> NodeEmitter<'c, 'a> {
    /// Start a block: emits `BeginNode` and, if named, `SetName`.
    pub fn begin(base: &NodeBase, kind: NodeKind, cx: &'c LoweringContext<'a>) -> Result<Self> {
        let node = cx.node_ref(base.id);
        let mut block = StatementBlock::new();
        block.push(Statement::BeginNode {
            node: node.clone(),
            parent: cx.parent.cloned(),
            id: base.id,
            kind,
        });
        if let Some(name) = base.name.as_deref() {
            block.push(Statement::SetName {
                node: node.clone(),
                name: escape_field(base.id, kind, "name", name)?,
            });
        }
        Ok(Self {
            cx,
            node,
            id: base.id,
            kind,
            block,
        })
    }

    /// Ref of the node being lowered.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Unwrap a required attribute or fail with `MalformedNode`.
    pub fn require<T>(&self, field: &str, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| CodegenError::missing(self.id, self.kind, field))
    }

    /// Unwrap a required text attribute; blank text counts as missing.
    pub fn require_text<'v>(&self, field: &str, value: Option<&'v str>) -> Result<&'v str> {
        match value {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(CodegenError::malformed(
                self.id,
                self.kind,
                field,
                "must not be blank",
            )),
            None => Err(CodegenError::missing(self.id, self.kind, field)),
        }
    }

    /// Error for an invalid value of `field`.
    pub fn malformed(&self, field: &str, reason: impl Into<String>) -> CodegenError {
        CodegenError::malformed(self.id, self.kind, field, reason)
    }

    /// Escape text attributed to `field` of this node.
    pub fn escape(&self, field: &str, text: &str) -> Result<EscapedStr> {
        escape_field(self.id, self.kind, field, text)
    }

    /// Emit `SetField` with a typed value.
    pub fn field(&mut self, field: &'static str, value: Literal) {
        self.block.push(Statement::SetField {
            node: self.node.clone(),
            field,
            value,
        });
    }

    /// Emit `SetField` with escaped text.
    pub fn text_field(&mut self, field: &'static str, text: &str) -> Result<()> {
        let value = Literal::Str(self.escape(field, text)?);
        self.field(field, value);
        Ok(())
    }

    /// Emit a required text field, failing if absent or blank.
    pub fn required_text(&mut self, field: &'static str, value: Option<&str>) -> Result<()> {
        let text = self.require_text(field, value)?;
        self.text_field(field, text)
    }

    /// Emit a text field only when present.
    pub fn optional_text(&mut self, field: &'static str, value: Option<&str>) -> Result<()> {
        match value {
            Some(text) => self.text_field(field, text),
            None => Ok(()),
        }
    }

    /// Emit a boolean field only when present.
    pub fn optional_bool(&mut self, field: &'static str, value: Option<bool>) {
        if let Some(b) = value {
            self.field(field, Literal::Bool(b));
        }
    }

    /// Append a variant-specific statement.
    pub fn push(&mut self, statement: Statement) {
        self.block.push(statement);
    }

    /// Append a nested block (composite children).
    pub fn append(&mut self, block: StatementBlock) {
        self.block.append(block);
    }

    /// Resolve a variable reference held in `field`.
    ///
    /// With reference checking on, an unknown name is an error; with it off,
    /// unknown names resolve to `None`.
    pub fn resolve_variable(&self, field: &str, name: &str) -> Result<Option<&'a Variable>> {
        match self.cx.scope.lookup(name) {
            Some(variable) => Ok(Some(variable)),
            None if self.cx.config.check_variable_refs => Err(self.malformed(
                field,
                format!("references undeclared variable '{}'", name),
            )),
            None => Ok(None),
        }
    }

    /// Emit an optional variable-name field plus the resolved variable's
    /// type as `variable_type`.
    pub fn variable_field(&mut self, field: &'static str, name: Option<&str>) -> Result<()> {
        let Some(name) = name else {
            return Ok(());
        };
        let resolved = self.resolve_variable(field, name)?;
        self.text_field(field, name)?;
        if let Some(variable) = resolved {
            self.text_field("variable_type", data_type_name(&variable.data_type))?;
        }
        Ok(())
    }

    /// Emit `MapData` statements for in and out mappings, in order.
    pub fn data_mappings(&mut self, inputs: &[DataMapping], outputs: &[DataMapping]) -> Result<()> {
        for (direction, field, mappings) in [
            (DataDirection::In, "in_mappings", inputs),
            (DataDirection::Out, "out_mappings", outputs),
        ] {
            for mapping in mappings {
                if mapping.parameter.trim().is_empty() {
                    return Err(self.malformed(field, "contains a mapping without parameter"));
                }
                self.resolve_variable(field, &mapping.variable)?;
                let statement = Statement::MapData {
                    node: self.node.clone(),
                    direction,
                    variable: self.escape(field, &mapping.variable)?,
                    parameter: self.escape(field, &mapping.parameter)?,
                };
                self.block.push(statement);
            }
        }
        Ok(())
    }

    /// Close the block: emits `MarkComplete`, then the node's metadata.
    pub fn finish(mut self, base: &NodeBase) -> Result<StatementBlock> {
        self.block.push(Statement::MarkComplete {
            node: self.node.clone(),
        });
        let owner = Owner::Node {
            node: &self.node,
            id: self.id,
            kind: self.kind,
        };
        metadata::emit_metadata(&mut self.block, owner, &base.metadata)?;
        Ok(self.block)
    }
}

/// Runtime type name of a variable type descriptor.
pub fn data_type_name(data_type: &DataType) -> &str {
    match data_type {
        DataType::Object { type_name } => type_name,
        other => other.as_str(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for routine tests.

    use std::collections::HashSet;

    use procflow_dsl::{NodeId, VariableScope};

    use crate::codegen::context::{LoweringContext, ScopeChain};
    use crate::codegen::literal::{EscapedStr, Literal, escape};
    use crate::codegen::registry::LoweringRegistry;
    use crate::codegen::statement::Statement;
    use crate::config::CodegenConfig;

    /// Owns everything a [`LoweringContext`] borrows.
    pub struct Fixture {
        pub scope: VariableScope,
        pub ids: HashSet<NodeId>,
        pub registry: LoweringRegistry,
        pub config: CodegenConfig,
    }

    impl Fixture {
        pub fn new(ids: &[NodeId]) -> Self {
            Self {
                scope: VariableScope::default(),
                ids: ids.iter().copied().collect(),
                registry: LoweringRegistry::standard(),
                config: CodegenConfig::default(),
            }
        }

        pub fn with_scope(mut self, scope: VariableScope) -> Self {
            self.scope = scope;
            self
        }

        pub fn lenient(mut self) -> Self {
            self.config.check_variable_refs = false;
            self
        }

        pub fn cx(&self) -> LoweringContext<'_> {
            LoweringContext {
                scope: ScopeChain::root(&self.scope),
                parent: None,
                declared_ids: &self.ids,
                registry: &self.registry,
                config: &self.config,
            }
        }
    }

    pub fn lit(text: &str) -> EscapedStr {
        escape(text).unwrap()
    }

    pub fn text(text: &str) -> Literal {
        Literal::Str(lit(text))
    }

    /// `(field, value)` of every SetField statement, in order.
    pub fn fields(statements: &[Statement]) -> Vec<(&'static str, Literal)> {
        statements
            .iter()
            .filter_map(|s| match s {
                Statement::SetField { field, value, .. } => Some((*field, value.clone())),
                _ => None,
            })
            .collect()
    }
}
