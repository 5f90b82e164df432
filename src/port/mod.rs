use crate::node::NodeId;
use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

mod connection;

pub use connection::PortConnection;

/// Whether a port receives or produces values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

/// How many simultaneous connections a port admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionPolicy {
    /// Any number of connections.
    #[default]
    Multiple,
    /// At most one; connecting replaces the existing connection.
    Override,
}

/// Identity of a port: its owning node plus its field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId {
    pub node: NodeId,
    pub field: String,
}

impl PortId {
    pub fn new(node: NodeId, field: impl Into<String>) -> Self {
        Self {
            node,
            field: field.into(),
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.field)
    }
}

/// A named, typed connection endpoint owned by a node.
///
/// Connection lists are only mutated by the owning [`NodeGraph`](crate::graph::NodeGraph),
/// which keeps both endpoints of every link in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePort {
    field_name: String,
    node: NodeId,
    value_type: ValueType,
    direction: PortDirection,
    policy: ConnectionPolicy,
    dynamic: bool,
    pub(crate) connections: Vec<PortConnection>,
}

impl NodePort {
    /// A port derived from the node type's declared schema.
    pub(crate) fn new_static(
        node: NodeId,
        field_name: impl Into<String>,
        value_type: ValueType,
        direction: PortDirection,
        policy: ConnectionPolicy,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            node,
            value_type,
            direction,
            policy,
            dynamic: false,
            connections: Vec::new(),
        }
    }

    /// A runtime-created port. Dynamic ports survive schema reconciliation.
    pub(crate) fn new_dynamic(
        node: NodeId,
        field_name: impl Into<String>,
        value_type: ValueType,
        direction: PortDirection,
        policy: ConnectionPolicy,
    ) -> Self {
        Self {
            dynamic: true,
            ..Self::new_static(node, field_name, value_type, direction, policy)
        }
    }

    pub fn id(&self) -> PortId {
        PortId::new(self.node, self.field_name.clone())
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub(crate) fn set_value_type(&mut self, value_type: ValueType) {
        self.value_type = value_type;
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_static(&self) -> bool {
        !self.dynamic
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    pub fn connections(&self) -> &[PortConnection] {
        &self.connections
    }

    /// The target of the first connection, the port's "primary" link.
    pub fn first_connection(&self) -> Option<PortId> {
        self.connections.first().map(PortConnection::target)
    }

    pub fn is_connected_to(&self, other: &PortId) -> bool {
        self.connections.iter().any(|c| c.points_to(other))
    }

    pub fn connection_index(&self, other: &PortId) -> Option<usize> {
        self.connections.iter().position(|c| c.points_to(other))
    }

    /// Moves ownership to `node`. Connections are left as they are.
    pub(crate) fn reassign(&mut self, node: NodeId) {
        self.node = node;
    }

    /// Swaps connected nodes from `old_nodes` with their counterparts in `new_nodes`.
    pub fn redirect(&mut self, old_nodes: &[Option<NodeId>], new_nodes: &[Option<NodeId>]) {
        for connection in &mut self.connections {
            connection.redirect(old_nodes, new_nodes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_flag() {
        let node = NodeId::new();
        let port = NodePort::new_dynamic(
            node,
            "extra",
            ValueType::Int,
            PortDirection::Input,
            ConnectionPolicy::Override,
        );
        assert!(port.is_dynamic());
        assert!(port.is_input());
        assert_eq!(port.id(), PortId::new(node, "extra"));
        assert_eq!(port.first_connection(), None);
    }

    #[test]
    fn test_port_survives_json_round_trip() {
        let (node, other) = (NodeId::new(), NodeId::new());
        let mut port = NodePort::new_static(
            node,
            "out",
            ValueType::Vector2,
            PortDirection::Output,
            ConnectionPolicy::Multiple,
        );
        let mut connection = PortConnection::new(&PortId::new(other, "in"));
        connection.reroute_points.push(glam::Vec2::new(4.0, -2.5));
        port.connections.push(connection);

        let json = serde_json::to_string(&port).unwrap();
        let restored: NodePort = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, port);
        assert_eq!(restored.id(), PortId::new(node, "out"));
        assert_eq!(restored.first_connection(), Some(PortId::new(other, "in")));
        assert_eq!(
            restored.connections()[0].reroute_points(),
            &[glam::Vec2::new(4.0, -2.5)]
        );
    }
}
