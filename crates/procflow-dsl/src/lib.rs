// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Process Model Type Definitions
//!
//! This crate defines the in-memory process model consumed by the procflow
//! compiler:
//! - Deserialization of model JSON produced by the ingestion stage
//! - Type-safe access to nodes, connections, variables and metadata
//! - JSON Schema generation for the model format via schemars
//!
//! The model is an immutable input: the compiler reads it, never mutates it.

// Provide imports needed by schema_types.rs
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Include the schema types
include!("schema_types.rs");

// JSON Schema of the model format
pub mod schema;

// ============================================================================
// Parsing Functions
// ============================================================================

/// Parse a single model from JSON text
pub fn parse_model(json: &str) -> Result<WorkflowModel, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to parse process model: {}", e))
}

/// Parse either a single model or an array of models from JSON text
pub fn parse_models(json: &str) -> Result<Vec<WorkflowModel>, String> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse JSON: {}", e))?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| format!("Failed to parse process models: {}", e)),
        other => serde_json::from_value(other)
            .map(|model| vec![model])
            .map_err(|e| format!("Failed to parse process model: {}", e)),
    }
}

// ============================================================================
// Node Accessors
// ============================================================================

impl Node {
    /// Shared attributes of this node.
    pub fn base(&self) -> &NodeBase {
        match self {
            Node::Start(n) => &n.base,
            Node::End(n) => &n.base,
            Node::Milestone(n) => &n.base,
            Node::Split(n) => &n.base,
            Node::Join(n) => &n.base,
            Node::HumanTask(n) => &n.base,
            Node::Action(n) => &n.base,
            Node::Timer(n) => &n.base,
            Node::Event(n) => &n.base,
            Node::BoundaryEvent(n) => &n.base,
            Node::SubProcess(n) => &n.base,
            Node::Composite(n) => &n.base,
            Node::RuleSet(n) => &n.base,
            Node::Fault(n) => &n.base,
        }
    }

    /// Variant tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Start(_) => NodeKind::Start,
            Node::End(_) => NodeKind::End,
            Node::Milestone(_) => NodeKind::Milestone,
            Node::Split(_) => NodeKind::Split,
            Node::Join(_) => NodeKind::Join,
            Node::HumanTask(_) => NodeKind::HumanTask,
            Node::Action(_) => NodeKind::Action,
            Node::Timer(_) => NodeKind::Timer,
            Node::Event(_) => NodeKind::Event,
            Node::BoundaryEvent(_) => NodeKind::BoundaryEvent,
            Node::SubProcess(_) => NodeKind::SubProcess,
            Node::Composite(_) => NodeKind::Composite,
            Node::RuleSet(_) => NodeKind::RuleSet,
            Node::Fault(_) => NodeKind::Fault,
        }
    }

    /// Stable node id.
    pub fn id(&self) -> NodeId {
        self.base().id
    }

    /// Annotations in insertion order.
    pub fn metadata(&self) -> &[MetadataEntry] {
        &self.base().metadata
    }
}

impl NodeKind {
    /// Name of the runtime factory method that creates a node of this kind.
    pub fn factory_method(self) -> &'static str {
        match self {
            NodeKind::Start => "start_node",
            NodeKind::End => "end_node",
            NodeKind::Milestone => "milestone_node",
            NodeKind::Split => "split_node",
            NodeKind::Join => "join_node",
            NodeKind::HumanTask => "human_task_node",
            NodeKind::Action => "action_node",
            NodeKind::Timer => "timer_node",
            NodeKind::Event => "event_node",
            NodeKind::BoundaryEvent => "boundary_event_node",
            NodeKind::SubProcess => "sub_process_node",
            NodeKind::Composite => "composite_node",
            NodeKind::RuleSet => "rule_set_node",
            NodeKind::Fault => "fault_node",
        }
    }
}

impl DataType {
    /// Name of the runtime type constructor for this descriptor.
    pub fn as_str(&self) -> &str {
        match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::Date => "Date",
            DataType::Object { .. } => "Object",
        }
    }
}
