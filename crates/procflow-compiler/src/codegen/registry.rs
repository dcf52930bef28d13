// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lowering routine registry.
//!
//! Maps every [`NodeKind`] to the routine that lowers it. The standard
//! registry is built from an exhaustive match, so adding a node variant
//! without a routine fails to compile. Registries built by hand may leave
//! kinds out; lowering such a node fails with
//! [`CodegenError::UnsupportedVariant`].

use procflow_dsl::{Node, NodeKind};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use super::context::LoweringContext;
use super::nodes;
use super::statement::StatementBlock;
use crate::error::{CodegenError, Result};

/// Signature shared by all lowering routines.
pub type LowerFn = fn(&Node, &LoweringContext<'_>) -> Result<StatementBlock>;

fn unsupported(node: &Node) -> CodegenError {
    CodegenError::UnsupportedVariant {
        node_id: node.id(),
        kind: node.kind(),
    }
}

/// Define an adapter from `&Node` to a variant-specific routine.
macro_rules! routine_adapter {
    ($name:ident, $variant:ident, $module:ident) => {
        fn $name(node: &Node, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
            match node {
                Node::$variant(inner) => nodes::$module::lower(inner, cx),
                other => Err(unsupported(other)),
            }
        }
    };
}

routine_adapter!(lower_start, Start, start);
routine_adapter!(lower_end, End, end);
routine_adapter!(lower_milestone, Milestone, milestone);
routine_adapter!(lower_split, Split, split);
routine_adapter!(lower_join, Join, join);
routine_adapter!(lower_human_task, HumanTask, human_task);
routine_adapter!(lower_action, Action, action);
routine_adapter!(lower_timer, Timer, timer);
routine_adapter!(lower_event, Event, event);
routine_adapter!(lower_boundary_event, BoundaryEvent, boundary_event);
routine_adapter!(lower_sub_process, SubProcess, sub_process);
routine_adapter!(lower_composite, Composite, composite);
routine_adapter!(lower_rule_set, RuleSet, rule_set);
routine_adapter!(lower_fault, Fault, fault);

/// The built-in routine for `kind`.
pub fn standard_routine(kind: NodeKind) -> LowerFn {
    match kind {
        NodeKind::Start => lower_start,
        NodeKind::End => lower_end,
        NodeKind::Milestone => lower_milestone,
        NodeKind::Split => lower_split,
        NodeKind::Join => lower_join,
        NodeKind::HumanTask => lower_human_task,
        NodeKind::Action => lower_action,
        NodeKind::Timer => lower_timer,
        NodeKind::Event => lower_event,
        NodeKind::BoundaryEvent => lower_boundary_event,
        NodeKind::SubProcess => lower_sub_process,
        NodeKind::Composite => lower_composite,
        NodeKind::RuleSet => lower_rule_set,
        NodeKind::Fault => lower_fault,
    }
}

/// Builder for a [`LoweringRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    routines: BTreeMap<NodeKind, LowerFn>,
}

impl RegistryBuilder {
    /// Builder with no routines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in routine for every kind.
    pub fn with_standard_routines(mut self) -> Self {
        for kind in NodeKind::iter() {
            self.routines.insert(kind, standard_routine(kind));
        }
        self
    }

    /// Register (or replace) the routine for `kind`.
    pub fn register(mut self, kind: NodeKind, routine: LowerFn) -> Self {
        self.routines.insert(kind, routine);
        self
    }

    pub fn build(self) -> LoweringRegistry {
        LoweringRegistry {
            routines: self.routines,
        }
    }
}

/// Immutable kind-to-routine table, shared read-only across compilations.
#[derive(Debug, Clone)]
pub struct LoweringRegistry {
    routines: BTreeMap<NodeKind, LowerFn>,
}

impl Default for LoweringRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl LoweringRegistry {
    /// Registry holding the built-in routine for every kind.
    pub fn standard() -> Self {
        RegistryBuilder::new().with_standard_routines().build()
    }

    /// The routine registered for `kind`, if any.
    pub fn routine(&self, kind: NodeKind) -> Option<LowerFn> {
        self.routines.get(&kind).copied()
    }

    /// Lower one node with the routine registered for its kind.
    pub fn lower(&self, node: &Node, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
        let routine = self.routine(node.kind()).ok_or_else(|| unsupported(node))?;
        routine(node, cx)
    }

    /// Kinds without a registered routine, in declaration order.
    pub fn missing_kinds(&self) -> Vec<NodeKind> {
        NodeKind::iter()
            .filter(|kind| !self.routines.contains_key(kind))
            .collect()
    }

    /// Returns true if every kind has a routine.
    pub fn is_complete(&self) -> bool {
        self.missing_kinds().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::nodes::test_support::Fixture;
    use procflow_dsl::{ActionNode, EndNode, NodeBase};

    fn action(id: u64) -> Node {
        Node::Action(ActionNode {
            base: NodeBase::new(id),
            script: Some("noop()".to_string()),
            dialect: None,
        })
    }

    #[test]
    fn test_standard_registry_is_complete() {
        let registry = LoweringRegistry::standard();
        assert!(registry.is_complete());
        for kind in NodeKind::iter() {
            assert!(registry.routine(kind).is_some(), "{} has no routine", kind);
        }
    }

    #[test]
    fn test_missing_routine_is_unsupported() {
        let registry = RegistryBuilder::new()
            .register(NodeKind::End, standard_routine(NodeKind::End))
            .build();
        let fixture = Fixture::new(&[4]);

        let err = registry.lower(&action(4), &fixture.cx()).unwrap_err();
        assert_eq!(
            err,
            CodegenError::UnsupportedVariant {
                node_id: 4,
                kind: NodeKind::Action,
            }
        );
        assert!(registry.missing_kinds().contains(&NodeKind::Action));
        assert!(!registry.is_complete());
    }

    #[test]
    fn test_mismatched_routine_is_unsupported() {
        let registry = RegistryBuilder::new()
            .with_standard_routines()
            .register(NodeKind::Action, standard_routine(NodeKind::End))
            .build();
        let fixture = Fixture::new(&[4]);

        assert!(matches!(
            registry.lower(&action(4), &fixture.cx()),
            Err(CodegenError::UnsupportedVariant { node_id: 4, .. })
        ));
    }

    #[test]
    fn test_register_overrides_routine() {
        fn silent(_: &Node, _: &LoweringContext<'_>) -> Result<StatementBlock> {
            Ok(StatementBlock::new())
        }

        let registry = RegistryBuilder::new()
            .with_standard_routines()
            .register(NodeKind::End, silent)
            .build();
        let fixture = Fixture::new(&[2]);
        let end = Node::End(EndNode {
            base: NodeBase::new(2),
            terminate: None,
        });
        assert!(registry.lower(&end, &fixture.cx()).unwrap().is_empty());
    }
}
