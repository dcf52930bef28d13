// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Reusable sub-process call lowering.

use procflow_dsl::{NodeKind, SubProcessNode};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_PROCESS_ID: &str = "process_id";
pub const FIELD_PROCESS_NAME: &str = "process_name";
pub const FIELD_WAIT_FOR_COMPLETION: &str = "wait_for_completion";
pub const FIELD_INDEPENDENT: &str = "independent";

/// Lower a SubProcess node.
pub fn lower(node: &SubProcessNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::SubProcess, cx)?;
    emitter.required_text(FIELD_PROCESS_ID, node.process_id.as_deref())?;
    emitter.optional_text(FIELD_PROCESS_NAME, node.process_name.as_deref())?;
    emitter.optional_bool(FIELD_WAIT_FOR_COMPLETION, node.wait_for_completion);
    emitter.optional_bool(FIELD_INDEPENDENT, node.independent);
    emitter.data_mappings(&node.in_mappings, &node.out_mappings)?;
    emitter.finish(&node.base)
}
