// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fault lowering.

use procflow_dsl::{FaultNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_FAULT_NAME: &str = "fault_name";
pub const FIELD_FAULT_VARIABLE: &str = "fault_variable";
pub const FIELD_TERMINATE_PARENT: &str = "terminate_parent";

/// Lower a Fault node. The fault variable, when given, must resolve in
/// scope.
pub fn lower(node: &FaultNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Fault, cx)?;
    emitter.required_text(FIELD_FAULT_NAME, node.fault_name.as_deref())?;
    if let Some(variable) = node.fault_variable.as_deref() {
        emitter.resolve_variable(FIELD_FAULT_VARIABLE, variable)?;
        emitter.text_field(FIELD_FAULT_VARIABLE, variable)?;
    }
    emitter.optional_bool(FIELD_TERMINATE_PARENT, node.terminate_parent);
    emitter.finish(&node.base)
}
