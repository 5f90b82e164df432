//! The node graph: ownership of nodes, their lifecycle and deep copies.

use crate::error::GraphError;
use crate::node::{Node, NodeId, NodeLogic};
use crate::port::{ConnectionPolicy, NodePort, PortDirection, PortId};
use crate::schema::{NodeKind, PortReconciliation, PortSchemaCache};
use crate::value::{Value, ValueType};
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

mod connect;
mod duplicate;
mod events;
mod values;

pub use connect::RerouteRef;
pub use events::{GraphEvent, GraphObserver};
pub use values::EvalContext;

/// An ordered collection of nodes and the connections between their ports.
///
/// Node order is significant: the last node draws and evaluates on top. A slot
/// may hold a tombstone (`None`) after [`destroy_node`](Self::destroy_node);
/// tombstones are skipped by iteration and preserved by [`copy`](Self::copy).
pub struct NodeGraph {
    pub name: String,
    nodes: Vec<Option<Node>>,
    /// Slot of every live node.
    index: AHashMap<NodeId, usize>,
    cache: Arc<PortSchemaCache>,
    observers: Vec<GraphObserver>,
}

pub struct GraphBuilder {
    name: String,
    cache: Arc<PortSchemaCache>,
    observers: Vec<GraphObserver>,
}

impl GraphBuilder {
    pub fn new(cache: Arc<PortSchemaCache>) -> Self {
        Self {
            name: "New Graph".to_string(),
            cache,
            observers: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&GraphEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn build(self) -> NodeGraph {
        NodeGraph {
            name: self.name,
            nodes: Vec::new(),
            index: AHashMap::new(),
            cache: self.cache,
            observers: self.observers,
        }
    }
}

impl NodeGraph {
    pub fn new(cache: Arc<PortSchemaCache>) -> Self {
        GraphBuilder::new(cache).build()
    }

    pub fn builder(cache: Arc<PortSchemaCache>) -> GraphBuilder {
        GraphBuilder::new(cache)
    }

    pub fn schema_cache(&self) -> &Arc<PortSchemaCache> {
        &self.cache
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&GraphEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    // --- Lookups ---

    fn slot_index(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Re-records the slot of every live node from `start` onwards.
    fn reindex_from(&mut self, start: usize) {
        for (slot, node) in self.nodes.iter().enumerate().skip(start) {
            if let Some(node) = node {
                self.index.insert(node.id(), slot);
            }
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(self.slot_index(id)?)?.as_ref()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slot_index(id)?;
        self.nodes.get_mut(slot)?.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Live nodes in order, skipping tombstones.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().map(Node::id).collect()
    }

    /// Slot contents in order, tombstones included.
    pub fn slots(&self) -> impl Iterator<Item = Option<&Node>> {
        self.nodes.iter().map(Option::as_ref)
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn port(&self, id: &PortId) -> Option<&NodePort> {
        self.node(id.node)?.port(&id.field)
    }

    pub(crate) fn port_mut(&mut self, id: &PortId) -> Option<&mut NodePort> {
        self.node_mut(id.node)?.port_mut(&id.field)
    }

    /// Every port id of every live node.
    pub fn port_ids(&self) -> Vec<PortId> {
        self.nodes()
            .flat_map(|n| n.ports().map(NodePort::id))
            .collect()
    }

    // --- Lifecycle ---

    /// Instantiates a node of a registered type and appends it to the graph.
    pub fn add_node(&mut self, type_name: &str) -> Result<NodeId, GraphError> {
        let registry = self.cache.registry();
        let definition = registry
            .get(type_name)
            .ok_or_else(|| GraphError::UnknownNodeType(type_name.to_string()))?;

        let mut node = Node::new(type_name, definition.instantiate());
        self.cache.update_ports(&mut node);
        let id = self.push_node(node);
        log::debug!("Added node {} of type '{}'", id, type_name);
        self.emit(GraphEvent::NodeAdded(id));
        Ok(id)
    }

    pub fn add_node_of<K: NodeKind>(&mut self) -> Result<NodeId, GraphError> {
        self.add_node(K::TYPE_NAME)
    }

    /// Appends a copy of an existing node. The copy keeps the original's field
    /// values but never its wiring.
    pub fn copy_node(&mut self, original: NodeId) -> Result<NodeId, GraphError> {
        let mut node = self
            .node(original)
            .ok_or(GraphError::NodeNotFound(original))?
            .duplicate();
        node.forget_connections();
        let id = self.push_node(node);
        self.emit(GraphEvent::NodeAdded(id));
        Ok(id)
    }

    /// Removes a node after disconnecting all of its ports on both sides.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        if !self.contains(id) {
            return Err(GraphError::NodeNotFound(id));
        }
        self.clear_node_connections(id);
        let index = self.slot_index(id).ok_or(GraphError::NodeNotFound(id))?;
        let node = self
            .nodes
            .remove(index)
            .ok_or(GraphError::NodeNotFound(id))?;
        self.index.remove(&id);
        self.reindex_from(index);
        log::debug!("Removed node {}", id);
        self.emit(GraphEvent::NodeRemoved(id));
        Ok(node)
    }

    /// Destroys a node in place, leaving a tombstone and every connection that
    /// points at it. Those connections heal lazily on the next traversal.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let index = self.slot_index(id).ok_or(GraphError::NodeNotFound(id))?;
        let node = self.nodes[index]
            .take()
            .ok_or(GraphError::NodeNotFound(id))?;
        self.index.remove(&id);
        self.emit(GraphEvent::NodeRemoved(id));
        Ok(node)
    }

    /// Drops every node. No per-node connection cleanup is done since nothing
    /// is left to point at.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.emit(GraphEvent::Cleared);
    }

    /// Creates an independent deep copy of this graph.
    ///
    /// Every node is duplicated under a fresh id first; only then are the
    /// connections of every new port redirected from the old ids to the new
    /// ones by slot position, because links are cross-referential.
    pub fn copy(&self) -> NodeGraph {
        let old_ids: Vec<Option<NodeId>> = self.slots().map(|s| s.map(Node::id)).collect();
        let mut nodes: Vec<Option<Node>> = self
            .nodes
            .iter()
            .map(|slot| slot.as_ref().map(Node::duplicate))
            .collect();
        let new_ids: Vec<Option<NodeId>> =
            nodes.iter().map(|s| s.as_ref().map(Node::id)).collect();

        for node in nodes.iter_mut().flatten() {
            for port in node.ports_mut().values_mut() {
                port.redirect(&old_ids, &new_ids);
            }
        }
        log::debug!("Copied graph '{}' ({} slots)", self.name, nodes.len());

        let mut copy = NodeGraph {
            name: self.name.clone(),
            nodes,
            index: AHashMap::new(),
            cache: Arc::clone(&self.cache),
            observers: Vec::new(),
        };
        copy.reindex_from(0);
        copy
    }

    /// Moves a node to the end of the node list so it draws on top.
    pub fn move_node_to_top(&mut self, id: NodeId) -> Result<(), GraphError> {
        let index = self.slot_index(id).ok_or(GraphError::NodeNotFound(id))?;
        self.nodes[index..].rotate_left(1);
        self.reindex_from(index);
        Ok(())
    }

    // --- Schema reconciliation ---

    /// Reconciles one node's static ports with its type's declaration.
    ///
    /// Links held by ports that were dropped or rebuilt are also removed from
    /// the ports on the other end.
    pub fn update_ports(&mut self, id: NodeId) -> Result<PortReconciliation, GraphError> {
        let cache = Arc::clone(&self.cache);
        let node = self.node_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        let linked: Vec<(PortId, Vec<PortId>)> = node
            .ports()
            .filter(|p| p.is_connected())
            .map(|p| (p.id(), p.connections().iter().map(|c| c.target()).collect()))
            .collect();

        let report = cache.update_ports(node);
        if report.removed > 0 {
            self.release_orphaned_links(linked);
        }
        Ok(report)
    }

    fn release_orphaned_links(&mut self, linked: Vec<(PortId, Vec<PortId>)>) {
        for (port, targets) in linked {
            for target in targets {
                if self.is_connected_to(&port, &target) {
                    continue;
                }
                if let Some(other) = self.port_mut(&target) {
                    other.connections.retain(|c| !c.points_to(&port));
                }
            }
        }
    }

    /// Reconciles every node, then prunes connections left dangling by ports
    /// that disappeared.
    pub fn update_all_ports(&mut self) -> PortReconciliation {
        let mut total = PortReconciliation::default();
        for id in self.node_ids() {
            if let Ok(report) = self.update_ports(id) {
                total.added += report.added;
                total.removed += report.removed;
                total.retyped += report.retyped;
            }
        }
        self.verify_all_connections();
        total
    }

    // --- Dynamic ports ---

    pub fn add_dynamic_port(
        &mut self,
        node: NodeId,
        field_name: &str,
        value_type: ValueType,
        direction: PortDirection,
        policy: ConnectionPolicy,
    ) -> Result<PortId, GraphError> {
        let id = PortId::new(node, field_name);
        let target = self.node_mut(node).ok_or(GraphError::NodeNotFound(node))?;
        if target.has_port(field_name) {
            return Err(GraphError::PortExists(id));
        }
        target.ports_mut().insert(
            field_name.to_string(),
            NodePort::new_dynamic(node, field_name, value_type, direction, policy),
        );
        self.emit(GraphEvent::NodeChanged(node));
        Ok(id)
    }

    pub fn add_dynamic_input(
        &mut self,
        node: NodeId,
        field_name: &str,
        value_type: ValueType,
        policy: ConnectionPolicy,
    ) -> Result<PortId, GraphError> {
        self.add_dynamic_port(node, field_name, value_type, PortDirection::Input, policy)
    }

    pub fn add_dynamic_output(
        &mut self,
        node: NodeId,
        field_name: &str,
        value_type: ValueType,
        policy: ConnectionPolicy,
    ) -> Result<PortId, GraphError> {
        self.add_dynamic_port(node, field_name, value_type, PortDirection::Output, policy)
    }

    /// Disconnects and removes a dynamic port. Declared ports are refused.
    pub fn remove_dynamic_port(&mut self, port: &PortId) -> Result<NodePort, GraphError> {
        let existing = self
            .port(port)
            .ok_or_else(|| GraphError::PortNotFound(port.clone()))?;
        if existing.is_static() {
            return Err(GraphError::StaticPort(port.clone()));
        }
        self.clear_connections(port);
        let removed = self
            .node_mut(port.node)
            .and_then(|n| n.ports_mut().shift_remove(&port.field))
            .ok_or_else(|| GraphError::PortNotFound(port.clone()))?;
        self.emit(GraphEvent::NodeChanged(port.node));
        Ok(removed)
    }

    // --- Field values ---

    /// Writes a node field and notifies observers. Returns whether the node
    /// accepted the value.
    pub fn set_node_field(
        &mut self,
        id: NodeId,
        field: &str,
        value: Value,
    ) -> Result<bool, GraphError> {
        self.modify_node(id, |logic| logic.set_field(field, value))
    }

    /// Runs `f` against the node's logic and notifies observers afterwards.
    pub fn modify_node<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn NodeLogic) -> R,
    ) -> Result<R, GraphError> {
        let node = self.node_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        let result = f(node.logic_mut());
        self.emit(GraphEvent::NodeChanged(id));
        Ok(result)
    }
}

impl fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes)
            .field("observers", &self.observers.len())
            .finish()
    }
}
