use crate::node::NodeId;
use crate::port::{PortDirection, PortId};
use thiserror::Error;

/// Reasons a connection attempt was refused.
///
/// A refused connection is never fatal: the graph is left untouched and a
/// warning is logged before the error is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Cannot connect: port '{0}' does not exist")]
    PortNotFound(PortId),

    #[error("Attempting to connect port '{0}' to itself")]
    SelfConnection(PortId),

    #[error("Port '{from}' is already connected to '{to}'")]
    AlreadyConnected { from: PortId, to: PortId },

    #[error("Cannot connect two {direction} ports ('{from}' and '{to}')")]
    SameDirection {
        direction: PortDirection,
        from: PortId,
        to: PortId,
    },
}

/// Errors raised by graph editing operations that target something specific.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node type '{0}' is not registered")]
    UnknownNodeType(String),

    #[error("Node '{0}' not found in this graph")]
    NodeNotFound(NodeId),

    #[error("Port '{0}' not found")]
    PortNotFound(PortId),

    #[error("Node already has a port named '{0}'")]
    PortExists(PortId),

    #[error("Port '{0}' is declared by the node type and cannot be removed at runtime")]
    StaticPort(PortId),

    #[error("Port '{port}' has no connection at index {index}")]
    ConnectionIndexOutOfRange { port: PortId, index: usize },

    #[error("Connection {connection} of port '{port}' has no reroute point at index {point}")]
    ReroutePointOutOfRange {
        port: PortId,
        connection: usize,
        point: usize,
    },
}

/// Configuration errors found while building node type port schemas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field '{field}' of node type '{node_type}' cannot be both input and output")]
    ConflictingDirection { node_type: String, field: String },
}
