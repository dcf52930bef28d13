// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Start node lowering.

use procflow_dsl::{NodeKind, StartNode};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_TRIGGER: &str = "trigger";
pub const FIELD_INTERRUPTING: &str = "interrupting";

/// Lower a Start node. All attributes are optional.
pub fn lower(node: &StartNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Start, cx)?;
    emitter.optional_text(FIELD_TRIGGER, node.trigger.as_deref())?;
    emitter.optional_bool(FIELD_INTERRUPTING, node.interrupting);
    emitter.finish(&node.base)
}
