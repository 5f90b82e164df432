//! Common test utilities: fixture node kinds and graph factories.
use std::sync::{Arc, Mutex};
use xnode::prelude::*;

/// One float output `out` (Multiple) producing `value`.
#[derive(Debug, Clone)]
pub struct SourceNode {
    pub value: f32,
}

impl Default for SourceNode {
    fn default() -> Self {
        Self { value: 1.5 }
    }
}

impl NodeLogic for SourceNode {
    fn value(&self, _ctx: &EvalContext<'_>, _port: &NodePort) -> Value {
        Value::Float(self.value)
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "value").then_some(Value::Float(self.value))
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        match (name, value) {
            ("value", Value::Float(v)) => {
                self.value = v;
                true
            }
            _ => false,
        }
    }
}

impl NodeKind for SourceNode {
    const TYPE_NAME: &'static str = "Source";

    fn fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::output("out", ValueType::Float),
            FieldDeclaration::field("value", ValueType::Float),
        ]
    }
}

/// One int output `out` (Multiple) producing `value`.
#[derive(Debug, Clone, Default)]
pub struct IntSourceNode {
    pub value: i32,
}

impl NodeLogic for IntSourceNode {
    fn value(&self, _ctx: &EvalContext<'_>, _port: &NodePort) -> Value {
        Value::Int(self.value)
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        match (name, value) {
            ("value", Value::Int(v)) => {
                self.value = v;
                true
            }
            _ => false,
        }
    }
}

impl NodeKind for IntSourceNode {
    const TYPE_NAME: &'static str = "IntSource";

    fn fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::output("out", ValueType::Int),
            FieldDeclaration::field("value", ValueType::Int),
        ]
    }
}

/// One float input `in` (Multiple).
#[derive(Debug, Clone, Default)]
pub struct SinkNode;

impl NodeLogic for SinkNode {}

impl NodeKind for SinkNode {
    const TYPE_NAME: &'static str = "Sink";

    fn fields() -> Vec<FieldDeclaration> {
        vec![FieldDeclaration::input("in", ValueType::Float)]
    }
}

/// One float input `in` that admits a single connection.
#[derive(Debug, Clone, Default)]
pub struct OverrideSinkNode;

impl NodeLogic for OverrideSinkNode {}

impl NodeKind for OverrideSinkNode {
    const TYPE_NAME: &'static str = "OverrideSink";

    fn fields() -> Vec<FieldDeclaration> {
        vec![FieldDeclaration::input("in", ValueType::Float).policy(ConnectionPolicy::Override)]
    }
}

/// Passes `in` through to `out` and counts connection hooks.
#[derive(Debug, Clone, Default)]
pub struct RecorderNode {
    pub created: i32,
    pub removed: i32,
}

impl NodeLogic for RecorderNode {
    fn value(&self, ctx: &EvalContext<'_>, _port: &NodePort) -> Value {
        ctx.input_value("in")
    }

    fn on_create_connection(&mut self, _from: &PortId, _to: &PortId) {
        self.created += 1;
    }

    fn on_remove_connection(&mut self, _port: &PortId) {
        self.removed += 1;
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "created" => Some(Value::Int(self.created)),
            "removed" => Some(Value::Int(self.removed)),
            _ => None,
        }
    }
}

impl NodeKind for RecorderNode {
    const TYPE_NAME: &'static str = "Recorder";

    fn fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::input("in", ValueType::Float),
            FieldDeclaration::output("out", ValueType::Float),
        ]
    }
}

/// The built-in library plus every fixture kind.
#[allow(dead_code)]
pub fn create_registry() -> NodeRegistry {
    NodeRegistry::builder()
        .register::<SourceNode>()
        .register::<IntSourceNode>()
        .register::<SinkNode>()
        .register::<OverrideSinkNode>()
        .register::<RecorderNode>()
        .build()
}

#[allow(dead_code)]
pub fn create_cache() -> Arc<PortSchemaCache> {
    Arc::new(PortSchemaCache::new(create_registry()))
}

#[allow(dead_code)]
pub fn create_graph() -> NodeGraph {
    NodeGraph::builder(create_cache()).name("Test Graph").build()
}

/// A graph with a source `n0` and a sink `n1`, unconnected.
#[allow(dead_code)]
pub fn create_source_sink_graph() -> (NodeGraph, PortId, PortId) {
    let mut graph = create_graph();
    let n0 = graph.add_node_of::<SourceNode>().unwrap();
    let n1 = graph.add_node_of::<SinkNode>().unwrap();
    (graph, PortId::new(n0, "out"), PortId::new(n1, "in"))
}

/// A graph whose observer appends every event to the returned log.
#[allow(dead_code)]
pub fn create_observed_graph() -> (NodeGraph, Arc<Mutex<Vec<GraphEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let graph = NodeGraph::builder(create_cache())
        .observer(move |event| sink.lock().unwrap().push(event.clone()))
        .build();
    (graph, events)
}

#[allow(dead_code)]
pub fn field_int(graph: &NodeGraph, node: NodeId, field: &str) -> i32 {
    match graph.node(node).and_then(|n| n.logic().field(field)) {
        Some(Value::Int(v)) => v,
        other => panic!("expected int field '{}', got {:?}", field, other),
    }
}
