// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Composite (embedded sub-process) lowering.
//!
//! The composite's block contains, between its own header and its
//! `MarkComplete`, the declarations of its local variables followed by the
//! full program of its nested graph. Nested nodes see the local variables
//! first and the enclosing scopes after them.

use procflow_dsl::{CompositeNode, NodeKind};

use super::NodeEmitter;
use crate::codegen::context::LoweringContext;
use crate::codegen::driver;
use crate::codegen::metadata::{self, Owner};
use crate::codegen::statement::StatementBlock;
use crate::error::Result;

/// Lower a Composite node together with its nested graph.
pub fn lower(node: &CompositeNode, cx: &LoweringContext<'_>) -> Result<StatementBlock> {
    let mut emitter = NodeEmitter::begin(&node.base, NodeKind::Composite, cx)?;

    let mut declarations = StatementBlock::new();
    let owner = Owner::Node {
        node: emitter.node(),
        id: emitter.id(),
        kind: NodeKind::Composite,
    };
    metadata::emit_variables(&mut declarations, owner, &node.variables)?;
    emitter.append(declarations);

    let scope = cx.scope.nested(&node.variables);
    let nested = driver::lower_graph(
        &node.graph,
        scope,
        Some(emitter.node()),
        Some(node.base.id),
        cx.registry,
        cx.config,
    )?;
    emitter.append(nested.into_block());

    emitter.finish(&node.base)
}
