// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Split (diverging gateway) lowering.
//!
//! Each branch constraint becomes one `AddConstraint` statement, in the
//! order the constraints were declared. A constraint may only guard a
//! branch to a node of the same graph.

use procflow_dsl::{NodeKind, SplitNode, SplitType};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::literal::Literal;
use crate::codegen::statement::{Statement, StatementBlock};
use crate::error::Result;

pub const FIELD_SPLIT_TYPE: &str = "split_type";
pub const FIELD_CONSTRAINTS: &str = "constraints";

/// Lower a Split node.
pub fn lower(node: &SplitNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Split, cx)?;
    let split_type = emitter.require(FIELD_SPLIT_TYPE, node.split_type)?;
    emitter.field(
        FIELD_SPLIT_TYPE,
        Literal::Variant {
            ty: "SplitType",
            variant: split_type.into(),
        },
    );

    let defaults = node.constraints.iter().filter(|c| c.is_default).count();
    if defaults > 1 && matches!(split_type, SplitType::Xor | SplitType::Or) {
        return Err(emitter.malformed(
            FIELD_CONSTRAINTS,
            format!("declares {} default branches", defaults),
        ));
    }

    for constraint in &node.constraints {
        if constraint.to == emitter.id() {
            return Err(emitter.malformed(FIELD_CONSTRAINTS, "guards a branch to the split itself"));
        }
        if !cx.is_declared(constraint.to) {
            return Err(emitter.malformed(
                FIELD_CONSTRAINTS,
                format!("guards a branch to unknown node {}", constraint.to),
            ));
        }
        let expression = emitter.require_text(FIELD_CONSTRAINTS, constraint.expression.as_deref())?;
        let statement = Statement::AddConstraint {
            node: emitter.node().clone(),
            target: constraint.to,
            expression: emitter.escape(FIELD_CONSTRAINTS, expression)?,
            dialect: constraint
                .dialect
                .as_deref()
                .map(|d| emitter.escape(FIELD_CONSTRAINTS, d))
                .transpose()?,
            priority: constraint.priority,
            is_default: constraint.is_default,
        };
        emitter.push(statement);
    }

    emitter.finish(&node.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::nodes::test_support::{Fixture, fields, lit};
    use crate::error::CodegenError;
    use procflow_dsl::{BranchConstraint, NodeBase};

    fn branch(to: u64, expression: &str) -> BranchConstraint {
        BranchConstraint {
            to,
            expression: Some(expression.to_string()),
            ..Default::default()
        }
    }

    fn split(split_type: SplitType, constraints: Vec<BranchConstraint>) -> SplitNode {
        SplitNode {
            base: NodeBase::new(2).named("Route"),
            split_type: Some(split_type),
            constraints,
        }
    }

    fn targets(block: &StatementBlock) -> Vec<u64> {
        block
            .statements()
            .iter()
            .filter_map(|s| match s {
                Statement::AddConstraint { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_split_type_is_a_variant() {
        let fixture = Fixture::new(&[2, 3]);
        let block = lower(&split(SplitType::And, vec![]), &fixture.cx()).unwrap();
        assert_eq!(
            fields(block.statements()),
            vec![(
                FIELD_SPLIT_TYPE,
                Literal::Variant {
                    ty: "SplitType",
                    variant: "And"
                }
            )]
        );
    }

    #[test]
    fn test_constraints_keep_declaration_order() {
        let fixture = Fixture::new(&[2, 3, 4, 5]);
        let node = split(
            SplitType::Xor,
            vec![branch(5, "a > 1"), branch(3, "a < 0"), branch(4, "true")],
        );
        let block = lower(&node, &fixture.cx()).unwrap();
        assert_eq!(targets(&block), vec![5, 3, 4]);
    }

    #[test]
    fn test_constraint_fields() {
        let fixture = Fixture::new(&[2, 3]);
        let mut constraint = branch(3, "amount > \"100\"");
        constraint.dialect = Some("mvel".to_string());
        constraint.priority = Some(1);
        constraint.is_default = true;

        let block = lower(&split(SplitType::Xor, vec![constraint]), &fixture.cx()).unwrap();
        let added = block
            .statements()
            .iter()
            .find(|s| matches!(s, Statement::AddConstraint { .. }))
            .unwrap();
        assert_eq!(
            added,
            &Statement::AddConstraint {
                node: fixture.cx().node_ref(2),
                target: 3,
                expression: lit("amount > \"100\""),
                dialect: Some(lit("mvel")),
                priority: Some(1),
                is_default: true,
            }
        );
    }

    #[test]
    fn test_missing_split_type() {
        let fixture = Fixture::new(&[2]);
        let mut node = split(SplitType::Xor, vec![]);
        node.split_type = None;
        assert_eq!(
            lower(&node, &fixture.cx()).unwrap_err(),
            CodegenError::missing(2, NodeKind::Split, FIELD_SPLIT_TYPE)
        );
    }

    #[test]
    fn test_branch_to_unknown_node() {
        let fixture = Fixture::new(&[2, 3]);
        let node = split(SplitType::Xor, vec![branch(9, "x")]);
        let err = lower(&node, &fixture.cx()).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::MalformedNode { node_id: 2, ref field, .. } if field == FIELD_CONSTRAINTS
        ));
    }

    #[test]
    fn test_blank_expression_is_malformed() {
        let fixture = Fixture::new(&[2, 3]);
        let node = split(SplitType::Or, vec![branch(3, "  ")]);
        assert!(matches!(
            lower(&node, &fixture.cx()).unwrap_err(),
            CodegenError::MalformedNode { .. }
        ));
    }

    #[test]
    fn test_two_defaults_on_xor_split() {
        let fixture = Fixture::new(&[2, 3, 4]);
        let mut first = branch(3, "a");
        first.is_default = true;
        let mut second = branch(4, "b");
        second.is_default = true;
        let node = split(SplitType::Xor, vec![first.clone(), second.clone()]);
        assert!(lower(&node, &fixture.cx()).is_err());

        // Parallel splits have no default branch semantics
        let node = split(SplitType::And, vec![first, second]);
        assert!(lower(&node, &fixture.cx()).is_ok());
    }
}
