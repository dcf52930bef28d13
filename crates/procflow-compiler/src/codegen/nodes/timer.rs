// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Timer lowering.

use procflow_dsl::{NodeKind, TimerDefinition, TimerNode};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::literal::Literal;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_TIMER: &str = "timer";
pub const FIELD_TIMER_TYPE: &str = "timer_type";
pub const FIELD_TIMER_EXPRESSION: &str = "timer_expression";
pub const FIELD_TIMER_PERIOD: &str = "timer_period";

/// Lower a Timer node.
pub fn lower(node: &TimerNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Timer, cx)?;
    let timer = emitter.require(FIELD_TIMER, node.timer.as_ref())?;

    let (variant, expression, period) = match timer {
        TimerDefinition::Delay { expression } => ("Delay", expression, None),
        TimerDefinition::Cycle { expression, period } => ("Cycle", expression, period.as_deref()),
        TimerDefinition::Date { expression } => ("Date", expression, None),
    };
    emitter.field(
        FIELD_TIMER_TYPE,
        Literal::Variant {
            ty: "TimerType",
            variant,
        },
    );
    emitter.required_text(FIELD_TIMER_EXPRESSION, Some(expression))?;
    emitter.optional_text(FIELD_TIMER_PERIOD, period)?;

    emitter.finish(&node.base)
}
