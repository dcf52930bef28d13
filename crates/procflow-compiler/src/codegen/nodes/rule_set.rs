// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rule set lowering.

use procflow_dsl::{NodeKind, RuleSetNode};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_RULE_FLOW_GROUP: &str = "rule_flow_group";
pub const FIELD_DIALECT: &str = "dialect";

pub fn lower(node: &RuleSetNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::RuleSet, cx)?;
    emitter.required_text(FIELD_RULE_FLOW_GROUP, node.rule_flow_group.as_deref())?;
    emitter.optional_text(FIELD_DIALECT, node.dialect.as_deref())?;
    emitter.finish(&node.base)
}
