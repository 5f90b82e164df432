//! Declarative port schemas for node types.
//!
//! Every node type publishes an ordered table of [`FieldDeclaration`]s. A
//! declaration marked as input or output becomes a static port on every node of
//! that type; the [`PortSchemaCache`] keeps live nodes in line with the tables.

use crate::node::NodeLogic;
use crate::port::{ConnectionPolicy, PortDirection};
use crate::value::ValueType;
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

mod cache;

pub use cache::{PortReconciliation, PortSchemaCache, PortTemplate};

/// One field of a node type, with its port markers.
///
/// A field with no marker is plain node data and produces no port. A field
/// carrying both markers is a configuration error reported when the schema
/// cache is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub value_type: ValueType,
    pub input: Option<ConnectionPolicy>,
    pub output: Option<ConnectionPolicy>,
}

impl FieldDeclaration {
    pub fn input(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::field(name, value_type).with_input(ConnectionPolicy::Multiple)
    }

    pub fn output(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::field(name, value_type).with_output(ConnectionPolicy::Multiple)
    }

    /// A plain field without any port marker.
    pub fn field(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            input: None,
            output: None,
        }
    }

    pub fn with_input(mut self, policy: ConnectionPolicy) -> Self {
        self.input = Some(policy);
        self
    }

    pub fn with_output(mut self, policy: ConnectionPolicy) -> Self {
        self.output = Some(policy);
        self
    }

    /// Replaces the policy of whichever marker is set.
    pub fn policy(mut self, policy: ConnectionPolicy) -> Self {
        if self.input.is_some() {
            self.input = Some(policy);
        }
        if self.output.is_some() {
            self.output = Some(policy);
        }
        self
    }

    /// The port this field declares, if exactly one marker is set.
    pub(crate) fn port_marker(&self) -> Option<(PortDirection, ConnectionPolicy)> {
        match (self.input, self.output) {
            (Some(policy), None) => Some((PortDirection::Input, policy)),
            (None, Some(policy)) => Some((PortDirection::Output, policy)),
            _ => None,
        }
    }
}

/// Builds a `Vec<FieldDeclaration>` from a compact table.
///
/// ```rust
/// use xnode::declare_ports;
///
/// let fields = declare_ports! {
///     input a: Float (Override),
///     input b: Float,
///     output result: Float,
///     field label: Text,
/// };
/// assert_eq!(fields.len(), 4);
/// ```
#[macro_export]
macro_rules! declare_ports {
    ( $( $kind:ident $name:ident : $ty:ident $( ( $policy:ident ) )? ),* $(,)? ) => {
        vec![
            $(
                $crate::schema::FieldDeclaration::$kind(stringify!($name), $crate::value::ValueType::$ty)
                    $( .policy($crate::port::ConnectionPolicy::$policy) )?
            ),*
        ]
    };
}

/// A node type registered statically by its Rust type.
pub trait NodeKind: NodeLogic + Default + Clone + 'static {
    const TYPE_NAME: &'static str;

    /// The ordered field table for this node type.
    fn fields() -> Vec<FieldDeclaration>;
}

type LogicFactory = Arc<dyn Fn() -> Box<dyn NodeLogic> + Send + Sync>;

/// Everything the graph needs to instantiate and reconcile one node type.
#[derive(Clone)]
pub struct NodeTypeDefinition {
    pub type_name: String,
    pub fields: Vec<FieldDeclaration>,
    factory: LogicFactory,
}

impl NodeTypeDefinition {
    pub fn new<F>(type_name: impl Into<String>, fields: Vec<FieldDeclaration>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn NodeLogic> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            fields,
            factory: Arc::new(factory),
        }
    }

    pub fn of<K: NodeKind>() -> Self {
        Self::new(K::TYPE_NAME, K::fields(), || Box::new(K::default()))
    }

    pub fn instantiate(&self) -> Box<dyn NodeLogic> {
        (self.factory)()
    }
}

impl fmt::Debug for NodeTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeDefinition")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// The set of node types known to an editing session.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: AHashMap<String, NodeTypeDefinition>,
    order: Vec<String>,
}

impl NodeRegistry {
    /// A builder with the built-in node library already registered.
    pub fn builder() -> NodeRegistryBuilder {
        NodeRegistryBuilder::new()
    }

    pub fn get(&self, type_name: &str) -> Option<&NodeTypeDefinition> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &NodeTypeDefinition> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

pub struct NodeRegistryBuilder {
    registry: NodeRegistry,
}

impl NodeRegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self::empty();
        crate::nodes::register_builtin_nodes(&mut builder);
        builder
    }

    /// A builder without the built-in node library.
    pub fn empty() -> Self {
        Self {
            registry: NodeRegistry::default(),
        }
    }

    pub fn register<K: NodeKind>(self) -> Self {
        self.register_definition(NodeTypeDefinition::of::<K>())
    }

    /// Registers a definition, replacing any earlier one with the same name.
    pub fn register_definition(mut self, definition: NodeTypeDefinition) -> Self {
        self.insert(definition);
        self
    }

    pub(crate) fn insert(&mut self, definition: NodeTypeDefinition) {
        let name = definition.type_name.clone();
        if self.registry.types.insert(name.clone(), definition).is_none() {
            self.registry.order.push(name);
        }
    }

    pub fn build(self) -> NodeRegistry {
        self.registry
    }
}

impl Default for NodeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
