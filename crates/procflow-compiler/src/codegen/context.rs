// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lowering context.
//!
//! Carries the read-only environment a routine needs: the variable scope
//! chain, the enclosing composite (if any), the ids declared in the current
//! graph, the registry used for nested graphs, and the configuration.
//! Also provides node reference generation.

use proc_macro2::{Ident, Span};
use procflow_dsl::{NodeId, Variable, VariableScope};
use serde::Serialize;
use std::collections::HashSet;

use super::registry::LoweringRegistry;
use crate::config::CodegenConfig;

/// Stable, human-readable handle of a node in the generated program.
///
/// A top-level node with id `N` is `node_N`; a node with id `M` nested in
/// composite `node_N` is `node_N_M`. Refs are unique within a model because
/// ids are unique within each graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeRef(String);

impl NodeRef {
    /// Ref of a node declared directly in the process graph.
    pub fn top_level(id: NodeId) -> Self {
        NodeRef(format!("node_{}", id))
    }

    /// Ref of a node declared inside the composite `parent`.
    pub fn nested(parent: &NodeRef, id: NodeId) -> Self {
        NodeRef(format!("{}_{}", parent.0, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ref as an identifier for generated code.
    pub fn ident(&self) -> Ident {
        Ident::new(&self.0, Span::call_site())
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variable lookup through nested scopes; the innermost declaration wins.
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'a> {
    scope: &'a VariableScope,
    parent: Option<&'a ScopeChain<'a>>,
}

impl<'a> ScopeChain<'a> {
    /// Chain rooted at the process scope.
    pub fn root(scope: &'a VariableScope) -> Self {
        Self {
            scope,
            parent: None,
        }
    }

    /// Chain extended by a nested scope.
    pub fn nested<'b>(&'b self, scope: &'b VariableScope) -> ScopeChain<'b> {
        ScopeChain {
            scope,
            parent: Some(self),
        }
    }

    /// Find the innermost declaration of `name`.
    pub fn lookup(&self, name: &str) -> Option<&'a Variable> {
        self.scope
            .lookup(name)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }
}

/// Read-only environment shared by the routines lowering one graph.
#[derive(Clone, Copy)]
pub struct LoweringContext<'a> {
    /// Variables visible to nodes of this graph
    pub scope: ScopeChain<'a>,
    /// Composite node owning this graph, `None` at process level
    pub parent: Option<&'a NodeRef>,
    /// Ids declared in this graph
    pub declared_ids: &'a HashSet<NodeId>,
    /// Routines used to lower nested graphs
    pub registry: &'a LoweringRegistry,
    /// Codegen options
    pub config: &'a CodegenConfig,
}

impl<'a> LoweringContext<'a> {
    /// Ref for a node of this graph.
    pub fn node_ref(&self, id: NodeId) -> NodeRef {
        match self.parent {
            Some(parent) => NodeRef::nested(parent, id),
            None => NodeRef::top_level(id),
        }
    }

    /// Returns true if `id` names a node of this graph.
    pub fn is_declared(&self, id: NodeId) -> bool {
        self.declared_ids.contains(&id)
    }
}

/// Sanitize a string to be a valid Rust identifier.
/// Replaces invalid characters with underscores.
pub fn sanitize_ident(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_alphanumeric() || c == '_' {
            // First character cannot be a digit
            if i == 0 && c.is_ascii_digit() {
                result.push('_');
            }
            result.push(c);
        } else {
            result.push('_');
        }
    }
    if result.is_empty() {
        result.push_str("_empty");
    }
    result
}
