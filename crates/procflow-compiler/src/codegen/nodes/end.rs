// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End node lowering.

use procflow_dsl::{EndNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_TERMINATE: &str = "terminate";

/// Lower an End node.
pub fn lower(node: &EndNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::End, cx)?;
    emitter.optional_bool(FIELD_TERMINATE, node.terminate);
    emitter.finish(&node.base)
}
