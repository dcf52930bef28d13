// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! JSON Schema generation for the process model format.

pub mod model_schema;

pub use model_schema::{MODEL_FORMAT_VERSION, generate_model_schema};
