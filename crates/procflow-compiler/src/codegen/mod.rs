// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lowering of process graphs into construction programs.
//!
//! A construction program is the ordered list of [`Statement`]s that,
//! replayed by the runtime's process factory, rebuilds the process. Each
//! node is lowered by the routine the [`LoweringRegistry`] maps its kind to;
//! the [`GraphCompiler`] drives the routines over a graph.

pub mod context;
pub mod driver;
pub mod literal;
pub mod metadata;
pub mod nodes;
pub mod registry;
pub mod statement;

pub use context::{LoweringContext, NodeRef, ScopeChain};
pub use driver::GraphCompiler;
pub use literal::{EscapedStr, Literal, LiteralEscapeError, escape};
pub use registry::{LowerFn, LoweringRegistry, RegistryBuilder};
pub use statement::{ConstructionProgram, DataDirection, Statement, StatementBlock};
