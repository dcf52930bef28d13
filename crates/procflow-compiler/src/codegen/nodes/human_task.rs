// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Human task lowering.
//!
//! Data mappings are emitted after the scalar fields, inputs first, each
//! direction in declaration order. Mapped variables must resolve in scope
//! when reference checking is on.

use procflow_dsl::{HumanTaskNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::literal::Literal;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_TASK_NAME: &str = "task_name";
pub const FIELD_ACTOR_ID: &str = "actor_id";
pub const FIELD_GROUP_ID: &str = "group_id";
pub const FIELD_COMMENT: &str = "comment";
pub const FIELD_PRIORITY: &str = "priority";
pub const FIELD_SKIPPABLE: &str = "skippable";

/// Lower a HumanTask node.
pub fn lower(node: &HumanTaskNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::HumanTask, cx)?;
    emitter.required_text(FIELD_TASK_NAME, node.task_name.as_deref())?;
    emitter.optional_text(FIELD_ACTOR_ID, node.actor_id.as_deref())?;
    emitter.optional_text(FIELD_GROUP_ID, node.group_id.as_deref())?;
    emitter.optional_text(FIELD_COMMENT, node.comment.as_deref())?;
    if let Some(priority) = node.priority {
        emitter.field(FIELD_PRIORITY, Literal::Int(priority));
    }
    emitter.optional_bool(FIELD_SKIPPABLE, node.skippable);
    emitter.data_mappings(&node.in_mappings, &node.out_mappings)?;
    emitter.finish(&node.base)
}
