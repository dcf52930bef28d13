// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Action (inline script) lowering.

use procflow_dsl::{ActionNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_SCRIPT: &str = "script";
pub const FIELD_DIALECT: &str = "dialect";

/// Lower an Action node.
pub fn lower(node: &ActionNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Action, cx)?;
    emitter.required_text(FIELD_SCRIPT, node.script.as_deref())?;
    emitter.optional_text(FIELD_DIALECT, node.dialect.as_deref())?;
    emitter.finish(&node.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::nodes::test_support::{Fixture, fields, text};
    use crate::error::CodegenError;
    use procflow_dsl::NodeBase;

    #[test]
    fn test_multiline_script_is_escaped() {
        let fixture = Fixture::new(&[4]);
        let script = "let total = a + b;\nprintln!(\"{}\", total);";
        let node = ActionNode {
            base: NodeBase::new(4).named("Sum"),
            script: Some(script.to_string()),
            dialect: Some("rhai".to_string()),
        };
        let block = lower(&node, &fixture.cx()).unwrap();
        assert_eq!(
            fields(block.statements()),
            vec![(FIELD_SCRIPT, text(script)), (FIELD_DIALECT, text("rhai"))]
        );
    }

    #[test]
    fn test_missing_script() {
        let fixture = Fixture::new(&[4]);
        let node = ActionNode {
            base: NodeBase::new(4),
            ..Default::default()
        };
        assert_eq!(
            lower(&node, &fixture.cx()).unwrap_err(),
            CodegenError::missing(4, NodeKind::Action, FIELD_SCRIPT)
        );
    }
}
