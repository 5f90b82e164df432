use super::NodeRegistry;
use crate::error::SchemaError;
use crate::node::Node;
use crate::port::{ConnectionPolicy, NodePort, PortDirection};
use crate::value::ValueType;
use ahash::AHashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// The static port a node type declares for one of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortTemplate {
    pub field_name: String,
    pub value_type: ValueType,
    pub direction: PortDirection,
    pub policy: ConnectionPolicy,
}

impl PortTemplate {
    /// Whether a live port can be kept for this template (possibly retyped).
    fn matches(&self, port: &NodePort) -> bool {
        port.is_static() && port.direction() == self.direction && port.policy() == self.policy
    }
}

/// What a call to [`NodeGraph::update_ports`](crate::graph::NodeGraph::update_ports) changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortReconciliation {
    pub added: usize,
    pub removed: usize,
    pub retyped: usize,
}

impl PortReconciliation {
    pub fn is_unchanged(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Default)]
struct SchemaTable {
    ports: AHashMap<String, Arc<[PortTemplate]>>,
    errors: Vec<SchemaError>,
}

/// Caches each node type's port templates and reconciles live nodes against them.
///
/// The table is built from the registry on first use and kept until
/// [`invalidate`](Self::invalidate) or [`replace_registry`](Self::replace_registry)
/// is called. One cache is meant to be shared (via `Arc`) by every graph of an
/// editing session.
#[derive(Debug)]
pub struct PortSchemaCache {
    registry: RwLock<Arc<NodeRegistry>>,
    table: RwLock<Option<Arc<SchemaTable>>>,
}

impl PortSchemaCache {
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            table: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> Arc<NodeRegistry> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in a new set of node declarations and drops the cached table.
    pub fn replace_registry(&self, registry: NodeRegistry) {
        *self.registry.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(registry);
        self.invalidate();
    }

    /// Drops the cached table; it is rebuilt on next use.
    pub fn invalidate(&self) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_built(&self) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The ordered templates of `type_name`. Unknown types have none.
    pub fn templates(&self, type_name: &str) -> Arc<[PortTemplate]> {
        self.table()
            .ports
            .get(type_name)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Configuration errors found while building the table.
    pub fn errors(&self) -> Vec<SchemaError> {
        self.table().errors.clone()
    }

    fn table(&self) -> Arc<SchemaTable> {
        if let Some(table) = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(table);
        }

        let mut slot = self.table.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have won the race while we waited for the lock.
        if let Some(table) = slot.as_ref() {
            return Arc::clone(table);
        }
        let table = Arc::new(Self::build(&self.registry()));
        *slot = Some(Arc::clone(&table));
        table
    }

    fn build(registry: &NodeRegistry) -> SchemaTable {
        let mut table = SchemaTable::default();
        for definition in registry.definitions() {
            let mut templates = Vec::new();
            for field in &definition.fields {
                if field.input.is_some() && field.output.is_some() {
                    let error = SchemaError::ConflictingDirection {
                        node_type: definition.type_name.clone(),
                        field: field.name.clone(),
                    };
                    log::error!("{}", error);
                    table.errors.push(error);
                    continue;
                }
                if let Some((direction, policy)) = field.port_marker() {
                    templates.push(PortTemplate {
                        field_name: field.name.clone(),
                        value_type: field.value_type,
                        direction,
                        policy,
                    });
                }
            }
            table
                .ports
                .insert(definition.type_name.clone(), Arc::from(templates));
        }
        log::debug!(
            "Built port schema table for {} node types ({} errors)",
            table.ports.len(),
            table.errors.len()
        );
        table
    }

    /// Reconciles the node's static ports with its type's declared templates.
    ///
    /// Ports whose direction, policy or dynamic flag disagree with their
    /// template are rebuilt, matching ports only have their value type
    /// refreshed, static ports without a template are dropped and missing
    /// templates are instantiated. Dynamic ports not named by a template are
    /// left alone. Running this twice in a row changes nothing the second time.
    ///
    /// Links of dropped ports are not released on the other end here.
    /// `NodeGraph::update_ports` does that after calling this.
    pub(crate) fn update_ports(&self, node: &mut Node) -> PortReconciliation {
        let templates = self.templates(node.type_name());
        let by_name: AHashMap<&str, &PortTemplate> = templates
            .iter()
            .map(|t| (t.field_name.as_str(), t))
            .collect();

        let node_id = node.id();
        let ports = node.ports_mut();
        let mut report = PortReconciliation::default();

        let live: Vec<String> = ports.keys().cloned().collect();
        for name in live {
            let template = by_name.get(name.as_str()).copied();
            let keep = match (ports.get(&name), template) {
                (Some(port), Some(template)) => template.matches(port),
                (Some(port), None) => port.is_dynamic(),
                (None, _) => continue,
            };
            if !keep {
                ports.shift_remove(&name);
                report.removed += 1;
                continue;
            }
            if let (Some(port), Some(template)) = (ports.get_mut(&name), template) {
                if port.value_type() != template.value_type {
                    port.set_value_type(template.value_type);
                    report.retyped += 1;
                }
            }
        }

        for template in templates.iter() {
            if !ports.contains_key(&template.field_name) {
                ports.insert(
                    template.field_name.clone(),
                    NodePort::new_static(
                        node_id,
                        template.field_name.clone(),
                        template.value_type,
                        template.direction,
                        template.policy,
                    ),
                );
                report.added += 1;
            }
        }

        if !report.is_unchanged() {
            log::debug!(
                "Reconciled ports of {} ({}): +{} -{} ~{}",
                node_id,
                node.type_name(),
                report.added,
                report.removed,
                report.retyped
            );
        }
        report
    }
}
