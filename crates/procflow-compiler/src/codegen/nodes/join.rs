// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Join (converging gateway) lowering.

use procflow_dsl::{JoinNode, JoinType, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::literal::Literal;
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

pub const FIELD_JOIN_TYPE: &str = "join_type";
pub const FIELD_N: &str = "n";

/// Lower a Join node. `n` is required for n-of-m joins and must be positive.
pub fn lower(node: &JoinNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Join, cx)?;
    let join_type = emitter.require(FIELD_JOIN_TYPE, node.join_type)?;
    emitter.field(
        FIELD_JOIN_TYPE,
        Literal::Variant {
            ty: "JoinType",
            variant: join_type.into(),
        },
    );

    let n = match (join_type, node.n) {
        (JoinType::NOfM, None) => return Err(emitter.malformed(FIELD_N, "is required for NOfM joins")),
        (_, Some(0)) => return Err(emitter.malformed(FIELD_N, "must be greater than zero")),
        (_, n) => n,
    };
    if let Some(n) = n {
        emitter.field(FIELD_N, Literal::UInt(u64::from(n)));
    }

    emitter.finish(&node.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::nodes::test_support::{Fixture, fields};
    use crate::error::CodegenError;
    use procflow_dsl::NodeBase;

    fn join(join_type: JoinType, n: Option<u32>) -> JoinNode {
        JoinNode {
            base: NodeBase::new(6),
            join_type: Some(join_type),
            n,
        }
    }

    #[test]
    fn test_and_join() {
        let fixture = Fixture::new(&[6]);
        let block = lower(&join(JoinType::And, None), &fixture.cx()).unwrap();
        assert_eq!(
            fields(block.statements()),
            vec![(
                FIELD_JOIN_TYPE,
                Literal::Variant {
                    ty: "JoinType",
                    variant: "And"
                }
            )]
        );
    }

    #[test]
    fn test_n_of_m_join_carries_n() {
        let fixture = Fixture::new(&[6]);
        let block = lower(&join(JoinType::NOfM, Some(2)), &fixture.cx()).unwrap();
        let fields = fields(block.statements());
        assert_eq!(fields[1], (FIELD_N, Literal::UInt(2)));
    }

    #[test]
    fn test_n_of_m_without_n() {
        let fixture = Fixture::new(&[6]);
        let err = lower(&join(JoinType::NOfM, None), &fixture.cx()).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::MalformedNode { node_id: 6, ref field, .. } if field == FIELD_N
        ));
    }

    #[test]
    fn test_zero_n_is_rejected() {
        let fixture = Fixture::new(&[6]);
        assert!(lower(&join(JoinType::NOfM, Some(0)), &fixture.cx()).is_err());
    }

    #[test]
    fn test_missing_join_type() {
        let fixture = Fixture::new(&[6]);
        let node = JoinNode {
            base: NodeBase::new(6),
            ..Default::default()
        };
        assert_eq!(
            lower(&node, &fixture.cx()).unwrap_err(),
            CodegenError::missing(6, NodeKind::Join, FIELD_JOIN_TYPE)
        );
    }
}
