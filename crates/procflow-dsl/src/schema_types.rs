// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Process model type definitions.
//
// This file is included by lib.rs and shares its imports
// (JsonSchema, Serialize, Deserialize).

/// Stable node identifier, assigned at model-load time and never reused
/// within a graph.
pub type NodeId = u64;

// ============================================================================
// Model
// ============================================================================

/// A complete process model as produced by the ingestion stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowModel {
    /// Model identifier (process id)
    pub id: String,

    /// Model name, used to name the generated definition
    #[serde(default)]
    pub name: String,

    /// Package the generated definition belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    /// Model version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Process-level variable declarations
    #[serde(default, skip_serializing_if = "VariableScope::is_empty")]
    pub variables: VariableScope,

    /// Process-level annotations, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,

    /// Nodes and connections of the process
    pub graph: WorkflowGraph,
}

/// Ordered collection of nodes and the connections between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    /// Nodes in source declaration order
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Connections in source declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
}

/// A directed edge between two nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Source node id
    pub from: NodeId,

    /// Target node id
    pub to: NodeId,

    /// Optional connection type tag
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<ConnectionType>,
}

/// Connection type tags understood by the runtime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Taken only when the source gateway's constraint holds
    Conditional,
    /// Taken when no other outgoing constraint holds
    Default,
    /// Links an activity to its compensation handler
    Compensation,
}

// ============================================================================
// Variables
// ============================================================================

/// Declared variables of a process or an embedded sub-process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VariableScope {
    /// Variables in declaration order
    pub variables: Vec<Variable>,
}

impl VariableScope {
    /// Create a scope from a list of declarations.
    pub fn new(variables: Vec<Variable>) -> Self {
        Self { variables }
    }

    /// Look a variable up by name.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Returns true if no variable is declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate declarations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    /// First name declared more than once, if any.
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.variables
            .iter()
            .find(|v| !seen.insert(v.name.as_str()))
            .map(|v| v.name.as_str())
    }
}

/// A single variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Variable name
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Variable {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Type descriptor of a declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    /// Any other type, named by the runtime
    Object {
        #[serde(rename = "typeName")]
        type_name: String,
    },
}

// ============================================================================
// Metadata
// ============================================================================

/// One key/value annotation. Kept as a list entry so that insertion order
/// survives deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetadataEntry {
    pub key: String,
    pub value: serde_json::Value,
}

impl MetadataEntry {
    /// Convenience constructor.
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Node Types
// ============================================================================

/// Union of all node variants, discriminated by the `nodeType` field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "nodeType")]
pub enum Node {
    /// Process entry point
    Start(StartNode),

    /// Process exit point
    End(EndNode),

    /// Waits until a boolean constraint holds
    Milestone(MilestoneNode),

    /// Diverging gateway
    Split(SplitNode),

    /// Converging gateway
    Join(JoinNode),

    /// Work item assigned to a person or group
    HumanTask(HumanTaskNode),

    /// Runs an inline script
    Action(ActionNode),

    /// Waits for a delay, a cycle or a date
    Timer(TimerNode),

    /// Waits for an external or process event
    Event(EventNode),

    /// Event attached to the boundary of another node
    BoundaryEvent(BoundaryEventNode),

    /// Calls a reusable process
    SubProcess(SubProcessNode),

    /// Embedded sub-process with its own nodes and variables
    Composite(CompositeNode),

    /// Fires a rule flow group
    RuleSet(RuleSetNode),

    /// Throws a fault
    Fault(FaultNode),
}

/// Fieldless tag of a [`Node`] variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum NodeKind {
    Start,
    End,
    Milestone,
    Split,
    Join,
    HumanTask,
    Action,
    Timer,
    Event,
    BoundaryEvent,
    SubProcess,
    Composite,
    RuleSet,
    Fault,
}

/// Attributes shared by every node variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeBase {
    /// Stable node id
    pub id: NodeId,

    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Annotations in insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

impl NodeBase {
    /// Base with an id and nothing else.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            name: None,
            metadata: Vec::new(),
        }
    }

    /// Set the display label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Process entry point
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Signal or message reference that triggers the start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupting: Option<bool>,
}

/// Process exit point
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Terminate the whole process instead of just this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminate: Option<bool>,
}

/// Waits until its constraint holds
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Boolean expression, required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,

    /// Variable bound when the constraint is satisfied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_variable: Option<String>,
}

/// Gateway semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::IntoStaticStr)]
pub enum SplitType {
    Xor,
    And,
    Or,
    XorEventBased,
}

/// Diverging gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_type: Option<SplitType>,

    /// Per-branch constraints, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<BranchConstraint>,
}

/// Constraint guarding one outgoing branch of a split.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchConstraint {
    /// Target node of the guarded branch
    pub to: NodeId,

    /// Boolean expression, required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Expression dialect; the runtime default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    #[serde(default)]
    pub is_default: bool,
}

/// Gateway semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::IntoStaticStr)]
pub enum JoinType {
    Xor,
    And,
    Or,
    Discriminator,
    /// Continue once `n` incoming branches completed
    NOfM,
}

/// Converging gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_type: Option<JoinType>,

    /// Required for [`JoinType::NOfM`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
}

/// Maps a process variable onto a task or sub-process parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataMapping {
    /// Process variable
    pub variable: String,
    /// Parameter on the node side
    pub parameter: String,
}

impl DataMapping {
    /// Convenience constructor.
    pub fn new(variable: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            parameter: parameter.into(),
        }
    }
}

/// Work item assigned to a person or group
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HumanTaskNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skippable: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_mappings: Vec<DataMapping>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub out_mappings: Vec<DataMapping>,
}

/// Runs an inline script
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
}

/// What a timer waits for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerDefinition {
    /// Fires once after a duration
    Delay { expression: String },
    /// Fires repeatedly
    Cycle {
        expression: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        period: Option<String>,
    },
    /// Fires at a point in time
    Date { expression: String },
}

/// Waits for a delay, a cycle or a date
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerDefinition>,
}

/// Waits for an event
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Variable receiving the event payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,

    /// Event scope, e.g. "external" or "process"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Event attached to another node of the same graph
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryEventNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Required; id of the host node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<NodeId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_activity: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
}

/// Calls a reusable process
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubProcessNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_completion: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub independent: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_mappings: Vec<DataMapping>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub out_mappings: Vec<DataMapping>,
}

/// Embedded sub-process
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompositeNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Variables local to the embedded sub-process
    #[serde(default, skip_serializing_if = "VariableScope::is_empty")]
    pub variables: VariableScope,

    /// Nested nodes and connections
    #[serde(default)]
    pub graph: WorkflowGraph,
}

/// Fires a rule flow group
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_flow_group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
}

/// Throws a fault
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaultNode {
    #[serde(flatten)]
    pub base: NodeBase,

    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_name: Option<String>,

    /// Variable holding fault data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_variable: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminate_parent: Option<bool>,
}
