//! # xnode - Port-based Node Graph Model
//!
//! **xnode** is the data model behind a visual node-graph editor: a [`NodeGraph`](graph::NodeGraph)
//! owns [`Node`](node::Node)s, each node owns named, typed [`NodePort`](port::NodePort)s, and
//! ports are linked by symmetric connections that carry visual reroute points. The crate
//! keeps that model consistent; drawing it and handling input is left to the host.
//!
//! ## Core Workflow
//!
//! 1.  **Declare Node Types**: Implement [`NodeLogic`](node::NodeLogic) and
//!     [`NodeKind`](schema::NodeKind) for your node structs. `NodeKind::fields` publishes the
//!     ordered port table (see [`declare_ports!`]).
//! 2.  **Register Them**: Build a [`NodeRegistry`](schema::NodeRegistry) and wrap it in a shared
//!     [`PortSchemaCache`](schema::PortSchemaCache). One cache serves every graph of a session.
//! 3.  **Edit**: Add nodes, connect ports, duplicate selections. Invalid connections are refused
//!     without touching the graph, and dangling links heal themselves on the next traversal.
//! 4.  **Evaluate**: Read input values; they are pulled through connections from upstream
//!     output ports, whose nodes compute them.
//!
//! ## Quick Start
//!
//! ```rust
//! use xnode::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let cache = Arc::new(PortSchemaCache::new(NodeRegistry::builder().build()));
//!     let mut graph = NodeGraph::builder(cache).name("Example").build();
//!
//!     let two = graph.add_node("Constant")?;
//!     let three = graph.add_node("Constant")?;
//!     let sum = graph.add_node("Sum")?;
//!     graph.set_node_field(two, "value", Value::Float(2.0))?;
//!     graph.set_node_field(three, "value", Value::Float(3.0))?;
//!
//!     let inputs = PortId::new(sum, "inputs");
//!     graph.connect(&PortId::new(two, "value"), &inputs)?;
//!     graph.connect(&PortId::new(three, "value"), &inputs)?;
//!
//!     assert_eq!(graph.output_value(&PortId::new(sum, "sum")), Value::Float(5.0));
//!
//!     // A deep copy is wired to its own nodes, never to the original's.
//!     let copy = graph.copy();
//!     let copied_sum = copy.node_ids()[2];
//!     assert_eq!(copy.output_value(&PortId::new(copied_sum, "sum")), Value::Float(5.0));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod port;
pub mod prelude;
pub mod schema;
pub mod value;
