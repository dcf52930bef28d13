// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Graph lowering driver.
//!
//! Lowers the nodes of a graph in declaration order, then checks and emits
//! its connections. Node ids are collected up front so that routines can
//! refer to nodes declared later in the same graph (split targets, boundary
//! hosts); connection endpoints are checked only after every node has been
//! lowered.

use procflow_dsl::{NodeId, VariableScope, WorkflowGraph};
use std::collections::HashSet;
use tracing::debug;

use super::context::{LoweringContext, NodeRef, ScopeChain};
use super::registry::LoweringRegistry;
use super::statement::{ConstructionProgram, Statement};
use crate::config::CodegenConfig;
use crate::error::{CodegenError, Result};

/// Lowers process graphs into construction programs.
#[derive(Debug, Clone, Copy)]
pub struct GraphCompiler<'a> {
    registry: &'a LoweringRegistry,
    config: &'a CodegenConfig,
}

impl<'a> GraphCompiler<'a> {
    pub fn new(registry: &'a LoweringRegistry, config: &'a CodegenConfig) -> Self {
        Self { registry, config }
    }

    /// Lower a top-level graph whose nodes see the variables of `scope`.
    ///
    /// The same graph, scope and configuration always produce the same
    /// program.
    pub fn compile(
        &self,
        graph: &WorkflowGraph,
        scope: &VariableScope,
    ) -> Result<ConstructionProgram> {
        lower_graph(
            graph,
            ScopeChain::root(scope),
            None,
            None,
            self.registry,
            self.config,
        )
    }
}

/// Lower one graph, top-level or nested in the composite `parent`.
pub(crate) fn lower_graph(
    graph: &WorkflowGraph,
    scope: ScopeChain<'_>,
    parent: Option<&NodeRef>,
    container_id: Option<NodeId>,
    registry: &LoweringRegistry,
    config: &CodegenConfig,
) -> Result<ConstructionProgram> {
    let mut declared = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !declared.insert(node.id()) {
            return Err(CodegenError::DuplicateNodeId {
                node_id: node.id(),
                container: container_id,
            });
        }
    }

    let cx = LoweringContext {
        scope,
        parent,
        declared_ids: &declared,
        registry,
        config,
    };

    let mut program = ConstructionProgram::new();
    for node in &graph.nodes {
        debug!(
            node_id = node.id(),
            kind = %node.kind(),
            container = ?container_id,
            "Lowering node"
        );
        program.append_block(registry.lower(node, &cx)?);
    }

    for connection in &graph.connections {
        for endpoint in [connection.from, connection.to] {
            if !declared.contains(&endpoint) {
                return Err(CodegenError::DanglingConnection {
                    from: connection.from,
                    to: connection.to,
                    missing: endpoint,
                    container: container_id,
                });
            }
        }
    }
    for connection in &graph.connections {
        program.push(Statement::Connect {
            container: parent.cloned(),
            from: connection.from,
            to: connection.to,
            connection_type: connection.connection_type,
        });
    }

    debug!(
        nodes = graph.nodes.len(),
        connections = graph.connections.len(),
        statements = program.len(),
        container = ?container_id,
        "Lowered graph"
    );
    Ok(program)
}
