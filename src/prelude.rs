//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the xnode crate.
//!
//! # Example
//!
//! ```rust
//! use xnode::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let cache = Arc::new(PortSchemaCache::new(NodeRegistry::builder().build()));
//! let mut graph = NodeGraph::new(cache);
//! let node = graph.add_node("Add")?;
//! assert!(graph.node(node).and_then(|n| n.output_port("result")).is_some());
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{EvalContext, GraphBuilder, GraphEvent, NodeGraph, RerouteRef};
pub use crate::node::{Node, NodeId, NodeLogic};
pub use crate::port::{ConnectionPolicy, NodePort, PortConnection, PortDirection, PortId};

// Schema
pub use crate::schema::{
    FieldDeclaration, NodeKind, NodeRegistry, NodeRegistryBuilder, NodeTypeDefinition,
    PortReconciliation, PortSchemaCache, PortTemplate,
};

// Values
pub use crate::value::{FromValue, Value, ValueType, WrappingSum};

// Error types
pub use crate::error::{ConnectError, GraphError, SchemaError};

pub use crate::declare_ports;
pub use glam::Vec2;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
