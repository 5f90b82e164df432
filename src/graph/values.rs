//! Value resolution: inputs pull from the output ports they are connected to,
//! and outputs ask their node's logic.

use super::NodeGraph;
use crate::node::NodeId;
use crate::port::{PortConnection, PortId};
use crate::value::{FromValue, Value, WrappingSum};
use std::cell::RefCell;

type EvalStack = RefCell<Vec<PortId>>;

/// Read access handed to [`NodeLogic::value`](crate::node::NodeLogic::value).
///
/// Field names refer to ports of the node being evaluated. The graph is
/// borrowed immutably here, so dangling connections are skipped rather than
/// pruned.
pub struct EvalContext<'g> {
    graph: &'g NodeGraph,
    node: NodeId,
    stack: &'g EvalStack,
}

impl<'g> EvalContext<'g> {
    pub fn graph(&self) -> &'g NodeGraph {
        self.graph
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn port_id(&self, field: &str) -> PortId {
        PortId::new(self.node, field)
    }

    pub fn input_value(&self, field: &str) -> Value {
        self.graph.resolve_input(&self.port_id(field), self.stack)
    }

    pub fn input_value_as<T: FromValue + Default>(&self, field: &str) -> T {
        T::from_value(&self.input_value(field)).unwrap_or_default()
    }

    pub fn try_input_value<T: FromValue>(&self, field: &str) -> Option<T> {
        T::from_value(&self.input_value(field))
    }

    /// The connected value if there is one of type `T`, otherwise `fallback`.
    pub fn input_or<T: FromValue>(&self, field: &str, fallback: T) -> T {
        self.try_input_value(field).unwrap_or(fallback)
    }

    pub fn input_values(&self, field: &str) -> Vec<Value> {
        self.graph.resolve_inputs(&self.port_id(field), self.stack)
    }

    pub fn input_values_as<T: FromValue + Default>(&self, field: &str) -> Vec<T> {
        typed_values(self.input_values(field))
    }

    pub fn input_sum<T: WrappingSum>(&self, field: &str, fallback: T) -> T {
        sum_values(self.input_values(field), fallback)
    }
}

fn typed_values<T: FromValue + Default>(values: Vec<Value>) -> Vec<T> {
    values
        .iter()
        .map(|v| T::from_value(v).unwrap_or_default())
        .collect()
}

fn sum_values<T: WrappingSum>(values: Vec<Value>, fallback: T) -> T {
    if values.is_empty() {
        return fallback;
    }
    values
        .iter()
        .filter_map(T::from_value)
        .fold(T::zero(), T::accumulate)
}

impl NodeGraph {
    fn resolve_output(&self, port: &PortId, stack: &EvalStack) -> Value {
        let Some(node) = self.node(port.node) else {
            return Value::Null;
        };
        let Some(target) = node.port(&port.field) else {
            return Value::Null;
        };
        if target.is_input() {
            return Value::Null;
        }
        if stack.borrow().contains(port) {
            log::warn!("Connection cycle detected while evaluating '{}'", port);
            return Value::Null;
        }

        stack.borrow_mut().push(port.clone());
        let ctx = EvalContext {
            graph: self,
            node: port.node,
            stack,
        };
        let value = node.logic().value(&ctx, target);
        stack.borrow_mut().pop();
        value
    }

    fn resolve_input(&self, port: &PortId, stack: &EvalStack) -> Value {
        self.port(port)
            .and_then(|p| p.first_connection())
            .map(|target| self.resolve_output(&target, stack))
            .unwrap_or(Value::Null)
    }

    fn resolve_inputs(&self, port: &PortId, stack: &EvalStack) -> Vec<Value> {
        let Some(p) = self.port(port) else {
            return Vec::new();
        };
        p.connections()
            .iter()
            .map(PortConnection::target)
            .filter(|target| self.port(target).is_some())
            .map(|target| self.resolve_output(&target, stack))
            .collect()
    }

    /// The value an output port produces. `Null` for input ports.
    pub fn output_value(&self, port: &PortId) -> Value {
        self.resolve_output(port, &EvalStack::default())
    }

    /// The output value of the port's first connection, `Null` if unconnected.
    pub fn input_value(&self, port: &PortId) -> Value {
        self.resolve_input(port, &EvalStack::default())
    }

    /// Like [`input_value`](Self::input_value), typed. Unconnected ports and
    /// values of another type yield `T::default()`.
    pub fn input_value_as<T: FromValue + Default>(&self, port: &PortId) -> T {
        T::from_value(&self.input_value(port)).unwrap_or_default()
    }

    /// `Some` only if the port is connected and the value has type `T`.
    pub fn try_input_value<T: FromValue>(&self, port: &PortId) -> Option<T> {
        T::from_value(&self.input_value(port))
    }

    /// Output values of every connection in list order. Connections whose
    /// target no longer resolves are removed first.
    pub fn input_values(&mut self, port: &PortId) -> Vec<Value> {
        self.verify_connections(port);
        self.resolve_inputs(port, &EvalStack::default())
    }

    pub fn input_values_as<T: FromValue + Default>(&mut self, port: &PortId) -> Vec<T> {
        typed_values(self.input_values(port))
    }

    /// Sums the connected values of type `T`, ignoring values of other types.
    /// Integer sums wrap. Returns `fallback` when nothing is connected.
    pub fn input_sum<T: WrappingSum>(&mut self, port: &PortId, fallback: T) -> T {
        sum_values(self.input_values(port), fallback)
    }
}
