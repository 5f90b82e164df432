use crate::node::NodeId;
use crate::port::PortId;

/// Notifications emitted by a [`NodeGraph`](super::NodeGraph) after each mutation,
/// so a host can repaint or persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    /// A node's field values or dynamic ports changed.
    NodeChanged(NodeId),
    Connected {
        from: PortId,
        to: PortId,
    },
    Disconnected {
        port: PortId,
        other: PortId,
    },
    Cleared,
}

pub type GraphObserver = Box<dyn FnMut(&GraphEvent) + Send>;
