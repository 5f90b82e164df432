use super::NodeGraph;
use crate::node::NodeId;
use crate::port::{NodePort, PortConnection, PortId};
use ahash::AHashMap;
use glam::Vec2;

impl NodeGraph {
    /// Duplicates a selection of nodes, offsetting the copies by `offset`.
    ///
    /// Links between two selected nodes are recreated between their copies.
    /// Links leaving the selection are not copied. Ids that are not part of
    /// this graph are ignored. Returns the new node ids in selection order.
    pub fn duplicate_nodes(&mut self, selection: &[NodeId], offset: Vec2) -> Vec<NodeId> {
        let mut substitutes: AHashMap<NodeId, NodeId> = AHashMap::new();
        let mut created = Vec::new();

        for &source in selection {
            if substitutes.contains_key(&source) {
                continue;
            }
            let Ok(copy) = self.copy_node(source) else {
                log::debug!("Ignoring node {} selected outside this graph", source);
                continue;
            };
            if let Some(node) = self.node_mut(copy) {
                node.position += offset;
            }
            substitutes.insert(source, copy);
            created.push(copy);
        }

        // (input, output) pairs as seen from the selected originals
        let links: Vec<(PortId, PortId)> = selection
            .iter()
            .filter_map(|id| self.node(*id))
            .flat_map(|node| node.ports())
            .flat_map(|port| {
                port.connections().iter().map(move |c| oriented(port, c))
            })
            .collect();

        for (input, output) in links {
            let (Some(new_input), Some(new_output)) =
                (substitutes.get(&input.node), substitutes.get(&output.node))
            else {
                continue;
            };
            let input = PortId::new(*new_input, input.field);
            let output = PortId::new(*new_output, output.field);
            if !self.is_connected_to(&input, &output) {
                // Refusals are logged by `connect`.
                let _ = self.connect(&input, &output);
            }
        }

        created
    }
}

fn oriented(port: &NodePort, connection: &PortConnection) -> (PortId, PortId) {
    if port.is_input() {
        (port.id(), connection.target())
    } else {
        (connection.target(), port.id())
    }
}
