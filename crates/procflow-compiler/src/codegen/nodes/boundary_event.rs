// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Boundary event lowering.
//!
//! A boundary event is attached to another node of the same graph. The
//! host may be declared after the event; only its presence in the graph is
//! checked.

use procflow_dsl::{BoundaryEventNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::literal::Literal;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_EVENT_TYPE: &str = "event_type";
pub const FIELD_ATTACHED_TO: &str = "attached_to";
pub const FIELD_CANCEL_ACTIVITY: &str = "cancel_activity";
pub const FIELD_VARIABLE_NAME: &str = "variable_name";

/// Lower a BoundaryEvent node.
pub fn lower(node: &BoundaryEventNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::BoundaryEvent, cx)?;
    emitter.required_text(FIELD_EVENT_TYPE, node.event_type.as_deref())?;

    let host = emitter.require(FIELD_ATTACHED_TO, node.attached_to)?;
    if host == emitter.id() {
        return Err(emitter.malformed(FIELD_ATTACHED_TO, "is attached to itself"));
    }
    if !cx.is_declared(host) {
        return Err(emitter.malformed(
            FIELD_ATTACHED_TO,
            format!("references unknown node {}", host),
        ));
    }
    emitter.field(FIELD_ATTACHED_TO, Literal::UInt(host));

    emitter.optional_bool(FIELD_CANCEL_ACTIVITY, node.cancel_activity);
    emitter.variable_field(FIELD_VARIABLE_NAME, node.variable_name.as_deref())?;
    emitter.finish(&node.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::nodes::test_support::{Fixture, fields, text};
    use crate::error::CodegenError;
    use procflow_dsl::NodeBase;

    fn boundary(attached_to: Option<u64>) -> BoundaryEventNode {
        BoundaryEventNode {
            base: NodeBase::new(11).named("Timeout"),
            event_type: Some("timeout".to_string()),
            attached_to,
            cancel_activity: Some(true),
            variable_name: None,
        }
    }

    #[test]
    fn test_attached_to_later_node() {
        // Host 12 is declared after the event
        let fixture = Fixture::new(&[11, 12]);
        let block = lower(&boundary(Some(12)), &fixture.cx()).unwrap();
        assert_eq!(
            fields(block.statements()),
            vec![
                (FIELD_EVENT_TYPE, text("timeout")),
                (FIELD_ATTACHED_TO, Literal::UInt(12)),
                (FIELD_CANCEL_ACTIVITY, Literal::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_missing_host() {
        let fixture = Fixture::new(&[11]);
        assert_eq!(
            lower(&boundary(None), &fixture.cx()).unwrap_err(),
            CodegenError::missing(11, NodeKind::BoundaryEvent, FIELD_ATTACHED_TO)
        );
    }

    #[test]
    fn test_unknown_host() {
        let fixture = Fixture::new(&[11]);
        let err = lower(&boundary(Some(40)), &fixture.cx()).unwrap_err();
        assert!(err.to_string().contains("unknown node 40"));
    }

    #[test]
    fn test_self_attachment() {
        let fixture = Fixture::new(&[11]);
        assert!(lower(&boundary(Some(11)), &fixture.cx()).is_err());
    }
}
