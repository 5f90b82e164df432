use super::PortId;
use crate::node::NodeId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One side of a link between two ports.
///
/// The target is stored as `(node, field)` and resolved through the graph on
/// every use, so a connection survives its target port being rebuilt by schema
/// reconciliation and can be repointed wholesale during a deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConnection {
    pub(crate) node: NodeId,
    pub(crate) field_name: String,
    /// Extra connection path points, used for visual organization only.
    pub(crate) reroute_points: Vec<Vec2>,
}

impl PortConnection {
    pub(crate) fn new(target: &PortId) -> Self {
        Self {
            node: target.node,
            field_name: target.field.clone(),
            reroute_points: Vec::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The port this connection points at.
    pub fn target(&self) -> PortId {
        PortId::new(self.node, self.field_name.clone())
    }

    pub fn points_to(&self, port: &PortId) -> bool {
        self.node == port.node && self.field_name == port.field
    }

    pub fn reroute_points(&self) -> &[Vec2] {
        &self.reroute_points
    }

    /// Swaps the target node if it appears in `old_nodes`, using the node at
    /// the same position in `new_nodes`.
    pub(crate) fn redirect(&mut self, old_nodes: &[Option<NodeId>], new_nodes: &[Option<NodeId>]) {
        let index = old_nodes.iter().position(|id| *id == Some(self.node));
        if let Some(Some(new_id)) = index.and_then(|i| new_nodes.get(i)) {
            self.node = *new_id;
        }
    }
}
