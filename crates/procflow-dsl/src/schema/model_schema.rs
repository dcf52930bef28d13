// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Model Schema Generation
//!
//! Generates JSON Schema for the process model from the Rust type definitions
//! in schema_types.rs using schemars.

use schemars::schema_for;
use serde_json::{Value, json};
use strum::IntoEnumIterator;

use crate::{DataType, NodeKind, WorkflowModel};

/// Version of the model format described by [`generate_model_schema`].
pub const MODEL_FORMAT_VERSION: &str = "1.0.0";

/// Generate the complete model schema with node kind metadata
pub fn generate_model_schema() -> Value {
    let schema = schema_for!(WorkflowModel);
    let mut schema_json = serde_json::to_value(&schema).unwrap_or(Value::Null);

    // DataType is reachable through variables already; NodeKind is not
    // referenced by any field but is useful to schema consumers.
    let node_kind_schema = schema_for!(NodeKind);
    let data_type_schema = schema_for!(DataType);

    if let Value::Object(ref mut map) = schema_json {
        if let Some(Value::Object(definitions)) = map.get_mut("definitions") {
            definitions.insert(
                "NodeKind".to_string(),
                serde_json::to_value(&node_kind_schema.schema).unwrap_or(Value::Null),
            );
            definitions
                .entry("DataType".to_string())
                .or_insert_with(|| {
                    serde_json::to_value(&data_type_schema.schema).unwrap_or(Value::Null)
                });
        }

        let node_types: Vec<Value> = NodeKind::iter()
            .map(|kind| {
                json!({
                    "type": kind.as_ref(),
                    "factoryMethod": kind.factory_method(),
                })
            })
            .collect();
        map.insert("x-node-types".to_string(), Value::Array(node_types));
        map.insert(
            "x-model-format-version".to_string(),
            Value::String(MODEL_FORMAT_VERSION.to_string()),
        );
    }

    schema_json
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_every_node_type() {
        let schema = generate_model_schema();
        let types = schema["x-node-types"].as_array().unwrap();
        assert_eq!(types.len(), NodeKind::iter().count());
        assert!(types.iter().any(|t| t["type"] == "Milestone"));
    }

    #[test]
    fn test_schema_has_definitions() {
        let schema = generate_model_schema();
        let definitions = schema["definitions"].as_object().unwrap();
        assert!(definitions.contains_key("Node"));
        assert!(definitions.contains_key("NodeKind"));
        assert_eq!(schema["x-model-format-version"], MODEL_FORMAT_VERSION);
    }
}
