//! Connection bookkeeping. Every mutation of a port's connection list goes
//! through here so both endpoints of a link always agree.

use super::{GraphEvent, NodeGraph};
use crate::error::{ConnectError, GraphError};
use crate::node::NodeId;
use crate::port::{ConnectionPolicy, NodePort, PortConnection, PortId};
use glam::Vec2;
use itertools::Itertools;
use std::cmp::Reverse;

/// Addresses a single reroute point: `point` on connection `connection` of `port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RerouteRef {
    pub port: PortId,
    pub connection: usize,
    pub point: usize,
}

impl RerouteRef {
    pub fn new(port: PortId, connection: usize, point: usize) -> Self {
        Self {
            port,
            connection,
            point,
        }
    }
}

impl NodeGraph {
    /// Connects two ports of opposite direction.
    ///
    /// Refused attempts leave the graph untouched, log a warning and return the
    /// reason. If either port uses [`ConnectionPolicy::Override`] and is already
    /// connected, its existing connections are cleared first. The new link is
    /// appended at the end of both lists.
    pub fn connect(&mut self, a: &PortId, b: &PortId) -> Result<(), ConnectError> {
        let (direction_a, policy_a) = match self.port(a) {
            Some(port) => (port.direction(), port.policy()),
            None => return Err(Self::reject(ConnectError::PortNotFound(a.clone()))),
        };
        let (direction_b, policy_b) = match self.port(b) {
            Some(port) => (port.direction(), port.policy()),
            None => return Err(Self::reject(ConnectError::PortNotFound(b.clone()))),
        };
        if a == b {
            return Err(Self::reject(ConnectError::SelfConnection(a.clone())));
        }
        if self.is_connected_to(a, b) {
            return Err(Self::reject(ConnectError::AlreadyConnected {
                from: a.clone(),
                to: b.clone(),
            }));
        }
        if direction_a == direction_b {
            return Err(Self::reject(ConnectError::SameDirection {
                direction: direction_a,
                from: a.clone(),
                to: b.clone(),
            }));
        }

        if policy_b == ConnectionPolicy::Override && self.connection_count(b) != 0 {
            self.clear_connections(b);
        }
        if policy_a == ConnectionPolicy::Override && self.connection_count(a) != 0 {
            self.clear_connections(a);
        }

        if let Some(port) = self.port_mut(a) {
            port.connections.push(PortConnection::new(b));
        }
        if let Some(port) = self.port_mut(b) {
            if !port.is_connected_to(a) {
                port.connections.push(PortConnection::new(a));
            }
        }

        self.with_logic(a.node, |logic| logic.on_create_connection(a, b));
        self.with_logic(b.node, |logic| logic.on_create_connection(a, b));
        self.emit(GraphEvent::Connected {
            from: a.clone(),
            to: b.clone(),
        });
        Ok(())
    }

    fn reject(error: ConnectError) -> ConnectError {
        log::warn!("{}", error);
        error
    }

    fn with_logic(&mut self, node: NodeId, f: impl FnOnce(&mut dyn crate::node::NodeLogic)) {
        if let Some(node) = self.node_mut(node) {
            f(node.logic_mut());
        }
    }

    /// Connects `output` to `input` and appends `points` to the new connection's
    /// reroute list on the output side.
    ///
    /// If the connection is gone again by the time it is looked up (a node hook
    /// may disconnect it), the points are silently dropped.
    pub fn connect_with_reroutes(
        &mut self,
        output: &PortId,
        input: &PortId,
        points: impl IntoIterator<Item = Vec2>,
    ) -> Result<(), ConnectError> {
        self.connect(output, input)?;
        if let Some(index) = self.connection_index(output, input) {
            if let Some(reroutes) = self.reroute_points_mut(output, index) {
                reroutes.extend(points);
            }
        }
        Ok(())
    }

    /// Removes every link between `a` and `b` on both sides.
    ///
    /// `b` may no longer exist; the entries on `a` are still dropped. Removal
    /// hooks run on every owning node that still exists.
    pub fn disconnect(&mut self, a: &PortId, b: &PortId) {
        if let Some(port) = self.port_mut(a) {
            port.connections.retain(|c| !c.points_to(b));
        }
        let other_exists = match self.port_mut(b) {
            Some(port) => {
                port.connections.retain(|c| !c.points_to(a));
                true
            }
            None => false,
        };

        self.with_logic(a.node, |logic| logic.on_remove_connection(a));
        if other_exists {
            self.with_logic(b.node, |logic| logic.on_remove_connection(b));
        }
        self.emit(GraphEvent::Disconnected {
            port: a.clone(),
            other: b.clone(),
        });
    }

    /// Disconnects a port from everything it is linked to.
    pub fn clear_connections(&mut self, port: &PortId) {
        while let Some(target) = self.port(port).and_then(NodePort::first_connection) {
            self.disconnect(port, &target);
        }
    }

    /// Disconnects every port of a node.
    pub fn clear_node_connections(&mut self, node: NodeId) {
        let ports: Vec<PortId> = match self.node(node) {
            Some(n) => n.ports().map(NodePort::id).collect(),
            None => return,
        };
        for port in &ports {
            self.clear_connections(port);
        }
    }

    /// Drops connections whose target node or port no longer exists.
    /// Returns how many were dropped.
    pub fn verify_connections(&mut self, port: &PortId) -> usize {
        let dangling: Vec<PortId> = match self.port(port) {
            Some(p) => p
                .connections()
                .iter()
                .map(PortConnection::target)
                .filter(|target| self.port(target).is_none())
                .collect(),
            None => return 0,
        };
        if dangling.is_empty() {
            return 0;
        }

        let Some(p) = self.port_mut(port) else {
            return 0;
        };
        let before = p.connections.len();
        p.connections
            .retain(|c| !dangling.iter().any(|target| c.points_to(target)));
        let pruned = before - p.connections.len();
        log::debug!("Pruned {} dangling connection(s) from '{}'", pruned, port);
        pruned
    }

    pub fn verify_all_connections(&mut self) -> usize {
        self.port_ids()
            .iter()
            .map(|port| self.verify_connections(port))
            .sum()
    }

    // --- Queries ---

    pub fn is_connected_to(&self, a: &PortId, b: &PortId) -> bool {
        self.port(a).is_some_and(|p| p.is_connected_to(b))
    }

    pub fn connection_count(&self, port: &PortId) -> usize {
        self.port(port).map_or(0, NodePort::connection_count)
    }

    /// Index of the connection from `a` to `b` in `a`'s list.
    pub fn connection_index(&self, a: &PortId, b: &PortId) -> Option<usize> {
        self.port(a)?.connection_index(b)
    }

    /// Targets of every connection of `port`, in connection order.
    pub fn connections(&self, port: &PortId) -> Vec<PortId> {
        self.port(port)
            .map(|p| p.connections().iter().map(PortConnection::target).collect())
            .unwrap_or_default()
    }

    /// The target of connection `index`, if it still resolves. A broken entry
    /// is removed on the way.
    pub fn connection(&mut self, port: &PortId, index: usize) -> Option<PortId> {
        let target = self.port(port)?.connections().get(index)?.target();
        if self.port(&target).is_some() {
            return Some(target);
        }
        if let Some(p) = self.port_mut(port) {
            p.connections.remove(index);
        }
        None
    }

    // --- Reroute points ---

    pub fn reroute_points(&self, port: &PortId, connection: usize) -> Option<&[Vec2]> {
        self.port(port)?
            .connections()
            .get(connection)
            .map(PortConnection::reroute_points)
    }

    pub fn reroute_points_mut(&mut self, port: &PortId, connection: usize) -> Option<&mut Vec<Vec2>> {
        self.port_mut(port)?
            .connections
            .get_mut(connection)
            .map(|c| &mut c.reroute_points)
    }

    fn reroutes_at(&mut self, at: &RerouteRef) -> Result<&mut Vec<Vec2>, GraphError> {
        if self.port(&at.port).is_none() {
            return Err(GraphError::PortNotFound(at.port.clone()));
        }
        self.reroute_points_mut(&at.port, at.connection)
            .ok_or_else(|| GraphError::ConnectionIndexOutOfRange {
                port: at.port.clone(),
                index: at.connection,
            })
    }

    fn point_out_of_range(at: &RerouteRef) -> GraphError {
        GraphError::ReroutePointOutOfRange {
            port: at.port.clone(),
            connection: at.connection,
            point: at.point,
        }
    }

    pub fn reroute(&self, at: &RerouteRef) -> Option<Vec2> {
        self.reroute_points(&at.port, at.connection)?
            .get(at.point)
            .copied()
    }

    /// Inserts a point before `at.point` (or at the end when equal to the length).
    pub fn insert_reroute(&mut self, at: &RerouteRef, position: Vec2) -> Result<(), GraphError> {
        let points = self.reroutes_at(at)?;
        if at.point > points.len() {
            return Err(Self::point_out_of_range(at));
        }
        points.insert(at.point, position);
        Ok(())
    }

    pub fn set_reroute(&mut self, at: &RerouteRef, position: Vec2) -> Result<(), GraphError> {
        let points = self.reroutes_at(at)?;
        let point = points
            .get_mut(at.point)
            .ok_or_else(|| Self::point_out_of_range(at))?;
        *point = position;
        Ok(())
    }

    /// Removes a batch of reroute points, highest point index first so earlier
    /// removals do not shift the indices of later ones. A point named twice is
    /// removed once. Returns how many were removed.
    pub fn remove_reroutes(&mut self, points: &[RerouteRef]) -> usize {
        let mut removed = 0;
        for at in points.iter().unique().sorted_by_key(|r| Reverse(r.point)) {
            if let Some(list) = self.reroute_points_mut(&at.port, at.connection) {
                if at.point < list.len() {
                    list.remove(at.point);
                    removed += 1;
                }
            }
        }
        removed
    }
}
