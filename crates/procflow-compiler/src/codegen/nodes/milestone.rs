// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Milestone node lowering.
//!
//! A milestone waits until its constraint holds. The optional match
//! variable is free text: it names the variable bound on satisfaction and
//! does not have to be declared in scope.

use procflow_dsl::{MilestoneNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_CONSTRAINT: &str = "constraint";
pub const FIELD_MATCH_VARIABLE: &str = "match_variable";

/// Lower a Milestone node.
pub fn lower(node: &MilestoneNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Milestone, cx)?;
    emitter.required_text(FIELD_CONSTRAINT, node.constraint.as_deref())?;
    emitter.optional_text(FIELD_MATCH_VARIABLE, node.match_variable.as_deref())?;
    emitter.finish(&node.base)
}
