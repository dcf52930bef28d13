// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Event lowering.

use procflow_dsl::{EventNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_EVENT_TYPE: &str = "event_type";
pub const FIELD_VARIABLE_NAME: &str = "variable_name";
pub const FIELD_SCOPE: &str = "scope";

/// Lower an Event node. The payload variable must resolve in scope when
/// reference checking is on.
pub fn lower(node: &EventNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Event, cx)?;
    emitter.required_text(FIELD_EVENT_TYPE, node.event_type.as_deref())?;
    emitter.variable_field(FIELD_VARIABLE_NAME, node.variable_name.as_deref())?;
    emitter.optional_text(FIELD_SCOPE, node.scope.as_deref())?;
    emitter.finish(&node.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::nodes::test_support::{Fixture, fields, text};
    use crate::error::CodegenError;
    use procflow_dsl::{DataType, NodeBase, Variable, VariableScope};

    fn event(variable: Option<&str>) -> EventNode {
        EventNode {
            base: NodeBase::new(5),
            event_type: Some("paymentReceived".to_string()),
            variable_name: variable.map(str::to_string),
            scope: Some("external".to_string()),
        }
    }

    #[test]
    fn test_payload_variable_carries_its_type() {
        let scope = VariableScope::new(vec![Variable::new("payment", DataType::Float)]);
        let fixture = Fixture::new(&[5]).with_scope(scope);
        let block = lower(&event(Some("payment")), &fixture.cx()).unwrap();
        assert_eq!(
            fields(block.statements()),
            vec![
                (FIELD_EVENT_TYPE, text("paymentReceived")),
                (FIELD_VARIABLE_NAME, text("payment")),
                ("variable_type", text("Float")),
                (FIELD_SCOPE, text("external")),
            ]
        );
    }

    #[test]
    fn test_undeclared_payload_variable() {
        let fixture = Fixture::new(&[5]);
        let err = lower(&event(Some("payment")), &fixture.cx()).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::MalformedNode { ref field, .. } if field == FIELD_VARIABLE_NAME
        ));
    }

    #[test]
    fn test_lenient_keeps_name_without_type() {
        let fixture = Fixture::new(&[5]).lenient();
        let block = lower(&event(Some("payment")), &fixture.cx()).unwrap();
        let names: Vec<&str> = fields(block.statements()).iter().map(|(f, _)| *f).collect();
        assert_eq!(names, vec![FIELD_EVENT_TYPE, FIELD_VARIABLE_NAME, FIELD_SCOPE]);
    }

    #[test]
    fn test_no_variable() {
        let fixture = Fixture::new(&[5]);
        assert!(lower(&event(None), &fixture.cx()).is_ok());
    }
}
