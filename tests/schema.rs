//! Tests for port schema caching and static/dynamic port reconciliation.
mod common;
use common::*;
use std::sync::Arc;
use xnode::prelude::*;

/// A registry where "Source" is redeclared with `fields`, as after a recompile.
fn redeclared_source(fields: Vec<FieldDeclaration>) -> NodeRegistry {
    NodeRegistryBuilder::empty()
        .register::<SinkNode>()
        .register_definition(NodeTypeDefinition::new("Source", fields, || {
            Box::new(SourceNode::default())
        }))
        .build()
}

fn port_names(graph: &NodeGraph, node: NodeId) -> Vec<String> {
    graph
        .node(node)
        .unwrap()
        .ports()
        .map(|p| p.field_name().to_string())
        .collect()
}

#[test]
fn test_cache_builds_lazily_and_invalidates() {
    let cache = create_cache();
    assert!(!cache.is_built());

    let templates = cache.templates("Source");
    assert!(cache.is_built());
    assert_eq!(
        templates.as_ref(),
        &[PortTemplate {
            field_name: "out".to_string(),
            value_type: ValueType::Float,
            direction: PortDirection::Output,
            policy: ConnectionPolicy::Multiple,
        }]
    );
    assert!(cache.templates("Unknown").is_empty());

    cache.invalidate();
    assert!(!cache.is_built());
}

#[test]
fn test_reconciliation_is_idempotent() {
    let mut graph = create_graph();
    let node = graph.add_node("Add").unwrap();
    let before = port_names(&graph, node);

    assert!(graph.update_ports(node).unwrap().is_unchanged());
    assert!(graph.update_ports(node).unwrap().is_unchanged());
    assert_eq!(port_names(&graph, node), before);
    assert_eq!(before, vec!["a", "b", "result"]);
}

#[test]
fn test_removed_field_drops_static_port() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let node = graph.add_node_of::<SourceNode>().unwrap();

    cache.replace_registry(redeclared_source(vec![FieldDeclaration::field(
        "value",
        ValueType::Float,
    )]));
    let report = graph.update_ports(node).unwrap();

    assert_eq!(report.removed, 1);
    assert!(port_names(&graph, node).is_empty());
}

#[test]
fn test_removed_connected_port_releases_both_sides() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let source = graph.add_node_of::<SourceNode>().unwrap();
    let out = PortId::new(source, "out");
    let sinks: Vec<PortId> = (0..2)
        .map(|_| PortId::new(graph.add_node_of::<SinkNode>().unwrap(), "in"))
        .collect();
    for sink in &sinks {
        graph.connect(&out, sink).unwrap();
    }

    cache.replace_registry(redeclared_source(vec![FieldDeclaration::field(
        "value",
        ValueType::Float,
    )]));
    let report = graph.update_ports(source).unwrap();

    assert_eq!(report.removed, 1);
    assert!(graph.port(&out).is_none());
    for sink in &sinks {
        assert_eq!(graph.connection_count(sink), 0);
        assert_eq!(graph.is_connected_to(sink, &out), graph.is_connected_to(&out, sink));
    }
    assert_eq!(graph.verify_all_connections(), 0);
}

#[test]
fn test_added_field_creates_port_in_declaration_order() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let node = graph.add_node_of::<SourceNode>().unwrap();

    cache.replace_registry(redeclared_source(declare_ports! {
        input gain: Float,
        output out: Float,
        output peak: Float (Override),
    }));
    let report = graph.update_ports(node).unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(port_names(&graph, node), vec!["out", "gain", "peak"]);
    let peak = graph.node(node).unwrap().output_port("peak").unwrap();
    assert_eq!(peak.policy(), ConnectionPolicy::Override);
    assert!(graph.update_ports(node).unwrap().is_unchanged());
}

#[test]
fn test_retyped_field_keeps_port_and_connections() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let source = graph.add_node_of::<SourceNode>().unwrap();
    let sink = PortId::new(graph.add_node_of::<SinkNode>().unwrap(), "in");
    let out = PortId::new(source, "out");
    graph.connect(&out, &sink).unwrap();

    cache.replace_registry(redeclared_source(vec![FieldDeclaration::output(
        "out",
        ValueType::Int,
    )]));
    let report = graph.update_all_ports();

    assert_eq!(report.retyped, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(graph.port(&out).unwrap().value_type(), ValueType::Int);
    assert!(graph.is_connected_to(&sink, &out));
}

#[test]
fn test_changed_direction_rebuilds_port_and_heals_links() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let source = graph.add_node_of::<SourceNode>().unwrap();
    let sink = PortId::new(graph.add_node_of::<SinkNode>().unwrap(), "in");
    let out = PortId::new(source, "out");
    graph.connect(&out, &sink).unwrap();

    cache.replace_registry(redeclared_source(vec![FieldDeclaration::input(
        "out",
        ValueType::Float,
    )]));
    let report = graph.update_all_ports();

    assert_eq!((report.removed, report.added), (1, 1));
    let rebuilt = graph.port(&out).unwrap();
    assert!(rebuilt.is_input());
    assert_eq!(rebuilt.connection_count(), 0);
    // The field name still resolves, but the sink's entry was released with
    // the old port so both sides agree.
    assert!(!graph.is_connected_to(&out, &sink));
    assert!(!graph.is_connected_to(&sink, &out));
    assert_eq!(graph.connection_count(&sink), 0);
}

#[test]
fn test_changed_policy_rebuilds_port() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let node = graph.add_node_of::<SourceNode>().unwrap();

    cache.replace_registry(redeclared_source(vec![
        FieldDeclaration::output("out", ValueType::Float).policy(ConnectionPolicy::Override),
    ]));
    let report = graph.update_ports(node).unwrap();

    assert_eq!((report.removed, report.added), (1, 1));
    let out = graph.node(node).unwrap().port("out").unwrap();
    assert_eq!(out.policy(), ConnectionPolicy::Override);
}

#[test]
fn test_dynamic_ports_survive_reconciliation() {
    let mut graph = create_graph();
    let node = graph.add_node_of::<SinkNode>().unwrap();
    graph
        .add_dynamic_output(node, "extra", ValueType::Bool, ConnectionPolicy::Multiple)
        .unwrap();

    let report = graph.update_ports(node).unwrap();
    assert!(report.is_unchanged());
    assert_eq!(port_names(&graph, node), vec!["in", "extra"]);
}

#[test]
fn test_dynamic_port_shadowing_a_declared_field_is_replaced() {
    let cache = create_cache();
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let node = graph.add_node_of::<SourceNode>().unwrap();
    graph
        .add_dynamic_input(node, "late", ValueType::Float, ConnectionPolicy::Multiple)
        .unwrap();

    cache.replace_registry(redeclared_source(vec![
        FieldDeclaration::output("out", ValueType::Float),
        FieldDeclaration::input("late", ValueType::Float),
    ]));
    graph.update_ports(node).unwrap();

    assert!(graph.node(node).unwrap().port("late").unwrap().is_static());
}

#[test]
fn test_conflicting_field_is_reported_and_skipped() {
    let registry = redeclared_source(vec![
        FieldDeclaration::output("out", ValueType::Float),
        FieldDeclaration::input("both", ValueType::Float).with_output(ConnectionPolicy::Multiple),
    ]);
    let cache = Arc::new(PortSchemaCache::new(registry));
    let mut graph = NodeGraph::new(Arc::clone(&cache));
    let node = graph.add_node("Source").unwrap();

    assert_eq!(port_names(&graph, node), vec!["out"]);
    assert_eq!(
        cache.errors(),
        vec![SchemaError::ConflictingDirection {
            node_type: "Source".to_string(),
            field: "both".to_string(),
        }]
    );
}

#[test]
fn test_cache_is_shared_between_graphs() {
    let cache = create_cache();
    let mut first = NodeGraph::new(Arc::clone(&cache));
    let mut second = NodeGraph::new(Arc::clone(&cache));
    let a = first.add_node("Multiply").unwrap();
    let b = second.add_node("Multiply").unwrap();

    assert_eq!(port_names(&first, a), port_names(&second, b));
    assert!(Arc::ptr_eq(first.schema_cache(), second.schema_cache()));
}
