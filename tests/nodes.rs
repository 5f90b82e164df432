//! Tests for the built-in node library.
mod common;
use common::*;
use xnode::prelude::*;

fn constant(graph: &mut NodeGraph, value: f32) -> PortId {
    let id = graph.add_node("Constant").unwrap();
    assert!(graph.set_node_field(id, "value", Value::Float(value)).unwrap());
    PortId::new(id, "value")
}

#[test]
fn test_builtin_types_are_registered() {
    let registry = NodeRegistry::builder().build();
    for name in ["Constant", "Sum", "Display", "Add", "Subtract", "Multiply", "Divide"] {
        assert!(registry.contains(name), "missing built-in '{}'", name);
    }
    assert!(NodeRegistryBuilder::empty().build().is_empty());
}

#[test]
fn test_sum_adds_every_connection() {
    let mut graph = create_graph();
    let sum = graph.add_node("Sum").unwrap();
    let inputs = PortId::new(sum, "inputs");
    let out = PortId::new(sum, "sum");
    assert_eq!(graph.output_value(&out), Value::Float(0.0));

    for value in [2.0, 3.0, 0.5] {
        let source = constant(&mut graph, value);
        graph.connect(&source, &inputs).unwrap();
    }
    assert_eq!(graph.output_value(&out), Value::Float(5.5));
}

#[test]
fn test_binary_nodes_fall_back_to_fields() {
    let mut graph = create_graph();
    let sub = graph.add_node("Subtract").unwrap();
    graph.set_node_field(sub, "a", Value::Int(10)).unwrap();
    graph.set_node_field(sub, "b", Value::Float(4.0)).unwrap();
    let result = PortId::new(sub, "result");
    assert_eq!(graph.output_value(&result), Value::Float(6.0));

    let source = constant(&mut graph, 1.0);
    graph.connect(&source, &PortId::new(sub, "b")).unwrap();
    assert_eq!(graph.output_value(&result), Value::Float(9.0));

    // Unknown fields are refused.
    assert!(!graph.set_node_field(sub, "c", Value::Float(1.0)).unwrap());
}

#[test]
fn test_binary_operand_ports_override() {
    let mut graph = create_graph();
    let mul = graph.add_node("Multiply").unwrap();
    let a = PortId::new(mul, "a");
    let first = constant(&mut graph, 2.0);
    let second = constant(&mut graph, 5.0);
    graph.connect(&first, &a).unwrap();
    graph.connect(&second, &a).unwrap();

    assert_eq!(graph.connections(&a), vec![second.clone()]);
    assert_eq!(graph.connection_count(&first), 0);
    assert_eq!(
        graph.output_value(&PortId::new(mul, "result")),
        Value::Float(0.0)
    );
}

#[test]
fn test_divide_by_zero_yields_zero() {
    let mut graph = create_graph();
    let div = graph.add_node("Divide").unwrap();
    graph.set_node_field(div, "a", Value::Float(3.0)).unwrap();
    let result = PortId::new(div, "result");
    assert_eq!(graph.output_value(&result), Value::Float(0.0));

    graph.set_node_field(div, "b", Value::Float(2.0)).unwrap();
    assert_eq!(graph.output_value(&result), Value::Float(1.5));
}

#[test]
fn test_chained_arithmetic() {
    let mut graph = create_graph();
    let add = graph.add_node("Add").unwrap();
    let display = graph.add_node("Display").unwrap();
    let two = constant(&mut graph, 2.0);
    let three = constant(&mut graph, 3.0);
    graph.connect(&two, &PortId::new(add, "a")).unwrap();
    graph.connect(&three, &PortId::new(add, "b")).unwrap();
    graph
        .connect(&PortId::new(add, "result"), &PortId::new(display, "input"))
        .unwrap();

    assert_eq!(
        graph.input_value(&PortId::new(display, "input")),
        Value::Float(5.0)
    );
    assert!(graph.set_node_field(display, "label", Value::from("total")).unwrap());
    assert_eq!(
        graph.node(display).unwrap().logic().field("label"),
        Some(Value::Text("total".to_string()))
    );
}

#[test]
fn test_display_accepts_any_type_once() {
    let mut graph = create_graph();
    let display = PortId::new(graph.add_node("Display").unwrap(), "input");
    let port = graph.port(&display).unwrap();
    assert_eq!(port.value_type(), ValueType::Any);
    assert_eq!(port.policy(), ConnectionPolicy::Override);

    let source = graph.add_node_of::<SinkNode>().unwrap();
    let flag = graph
        .add_dynamic_output(source, "flag", ValueType::Bool, ConnectionPolicy::Multiple)
        .unwrap();
    graph.connect(&flag, &display).unwrap();
    assert_eq!(graph.connection_count(&display), 1);
}
