use crate::graph::EvalContext;
use crate::port::{NodePort, PortId};
use crate::value::Value;
use std::fmt;

/// Host-supplied behaviour of a node.
///
/// The graph only routes values and tracks connectivity; what a node computes
/// is entirely up to its logic. The logic also owns the node's field values,
/// which is what gets cloned when a node is copied.
pub trait NodeLogic: LogicClone + fmt::Debug + Send + Sync {
    /// Computes the value of one of this node's output ports.
    fn value(&self, _ctx: &EvalContext<'_>, _port: &NodePort) -> Value {
        Value::Null
    }

    /// Called on both owning nodes after a connection is created.
    fn on_create_connection(&mut self, _from: &PortId, _to: &PortId) {}

    /// Called on each owning node after one of its ports was disconnected.
    fn on_remove_connection(&mut self, _port: &PortId) {}

    /// Reads a field value by name.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Writes a field value by name. Returns `false` if the field is unknown
    /// or the value has the wrong type.
    fn set_field(&mut self, _name: &str, _value: Value) -> bool {
        false
    }
}

/// Object-safe cloning for boxed [`NodeLogic`].
pub trait LogicClone {
    fn clone_box(&self) -> Box<dyn NodeLogic>;
}

impl<T> LogicClone for T
where
    T: 'static + NodeLogic + Clone,
{
    fn clone_box(&self) -> Box<dyn NodeLogic> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn NodeLogic> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
