use crate::port::{NodePort, PortDirection};
use glam::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

mod logic;

pub use logic::{LogicClone, NodeLogic};

/// Globally unique node identity.
///
/// Ids are never reused, so a copied graph can never be confused with its
/// source when connections are redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first group is plenty to tell nodes apart in logs.
        let text = self.0.simple().to_string();
        f.write_str(&text[..8])
    }
}

/// A node: a set of ports plus the logic that computes their values.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    type_name: String,
    /// Display name.
    pub name: String,
    /// Authoring position on the canvas. Never used in computation.
    pub position: Vec2,
    ports: IndexMap<String, NodePort>,
    logic: Box<dyn NodeLogic>,
}

impl Node {
    pub(crate) fn new(type_name: impl Into<String>, logic: Box<dyn NodeLogic>) -> Self {
        let type_name = type_name.into();
        Self {
            id: NodeId::new(),
            name: type_name.clone(),
            type_name,
            position: Vec2::ZERO,
            ports: IndexMap::new(),
            logic,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All ports in declaration/creation order.
    pub fn ports(&self) -> impl Iterator<Item = &NodePort> {
        self.ports.values()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn port(&self, field_name: &str) -> Option<&NodePort> {
        self.ports.get(field_name)
    }

    pub fn has_port(&self, field_name: &str) -> bool {
        self.ports.contains_key(field_name)
    }

    pub fn input_port(&self, field_name: &str) -> Option<&NodePort> {
        self.port(field_name).filter(|p| p.is_input())
    }

    pub fn output_port(&self, field_name: &str) -> Option<&NodePort> {
        self.port(field_name).filter(|p| p.is_output())
    }

    pub fn inputs(&self) -> impl Iterator<Item = &NodePort> {
        self.ports_in(PortDirection::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &NodePort> {
        self.ports_in(PortDirection::Output)
    }

    pub fn dynamic_ports(&self) -> impl Iterator<Item = &NodePort> {
        self.ports.values().filter(|p| p.is_dynamic())
    }

    fn ports_in(&self, direction: PortDirection) -> impl Iterator<Item = &NodePort> {
        self.ports.values().filter(move |p| p.direction() == direction)
    }

    pub fn logic(&self) -> &dyn NodeLogic {
        self.logic.as_ref()
    }

    pub(crate) fn logic_mut(&mut self) -> &mut dyn NodeLogic {
        self.logic.as_mut()
    }

    pub(crate) fn port_mut(&mut self, field_name: &str) -> Option<&mut NodePort> {
        self.ports.get_mut(field_name)
    }

    pub(crate) fn ports_mut(&mut self) -> &mut IndexMap<String, NodePort> {
        &mut self.ports
    }

    /// Clones this node under a fresh id. Connections are kept verbatim and
    /// still point at the original targets.
    pub(crate) fn duplicate(&self) -> Node {
        let mut node = self.clone();
        node.id = NodeId::new();
        for port in node.ports.values_mut() {
            port.reassign(node.id);
        }
        node
    }

    /// Drops every connection held by this node's ports without touching the
    /// other endpoints. Only valid for nodes nothing else points at yet.
    pub(crate) fn forget_connections(&mut self) {
        for port in self.ports.values_mut() {
            port.connections.clear();
        }
    }
}
