use ahash::AHashMap;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use xnode::prelude::*;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the graph file format and are only used here to drive the graph API.

#[derive(Deserialize)]
struct RawGraph {
    #[serde(default)]
    name: Option<String>,
    nodes: Vec<RawNode>,
    #[serde(default)]
    connections: Vec<RawConnection>,
}

#[derive(Deserialize)]
struct RawNode {
    key: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    position: Vec2,
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawConnection {
    from: String,
    to: String,
    #[serde(default)]
    reroutes: Vec<Vec2>,
}

/// Builds a node graph from a JSON description and prints its resolved port values
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the graph JSON file
    graph_path: String,

    /// Print a deep copy of the graph instead of the graph itself
    #[arg(short, long)]
    copy: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let total_start = Instant::now();

    // --- 1. File Loading ---
    let graph_json = fs::read_to_string(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read graph file '{}': {}",
            &cli.graph_path, e
        ))
    });
    let raw_graph: RawGraph = serde_json::from_str(&graph_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse graph JSON: {}", e)));

    // --- 2. Graph Construction ---
    let build_start = Instant::now();
    let cache = Arc::new(PortSchemaCache::new(NodeRegistry::builder().build()));
    for error in cache.errors() {
        eprintln!("Schema warning: {}", error);
    }
    let mut graph = build_graph(raw_graph, cache)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build graph: {}", e)));
    let build_duration = build_start.elapsed();

    if cli.copy {
        graph = graph.copy();
        println!("Printing a deep copy of the graph.");
    }

    // --- 3. Report ---
    print_graph(&graph);

    println!("\n--- Summary ---");
    println!("Nodes:              {}", graph.node_count());
    let links: usize = graph
        .nodes()
        .flat_map(|n| n.outputs())
        .map(NodePort::connection_count)
        .sum();
    println!("Connections:        {}", links);
    println!("Graph Construction: {:?}", build_duration);
    println!("Total Execution:    {:?}", total_start.elapsed());
}

fn build_graph(raw: RawGraph, cache: Arc<PortSchemaCache>) -> Result<NodeGraph> {
    let mut builder = NodeGraph::builder(cache);
    if let Some(name) = raw.name {
        builder = builder.name(name);
    }
    let mut graph = builder.build();
    let mut keys: AHashMap<String, NodeId> = AHashMap::new();

    for raw_node in raw.nodes {
        let id = graph.add_node(&raw_node.node_type)?;
        if let Some(node) = graph.node_mut(id) {
            node.name = raw_node.name.unwrap_or_else(|| raw_node.key.clone());
            node.position = raw_node.position;
        }
        for (field, json) in &raw_node.fields {
            if !graph.set_node_field(id, field, Value::from_json(json))? {
                log::warn!(
                    "Node '{}' ({}) ignored field '{}' = {}",
                    raw_node.key,
                    raw_node.node_type,
                    field,
                    json
                );
            }
        }
        if keys.insert(raw_node.key.clone(), id).is_some() {
            return Err(format!("Duplicate node key '{}'", raw_node.key).into());
        }
    }

    for connection in raw.connections {
        let from = resolve_port(&keys, &connection.from)?;
        let to = resolve_port(&keys, &connection.to)?;
        graph.connect_with_reroutes(&from, &to, connection.reroutes)?;
    }
    Ok(graph)
}

/// Turns a `"key.field"` reference into a port id.
fn resolve_port(keys: &AHashMap<String, NodeId>, reference: &str) -> Result<PortId> {
    let (key, field) = reference
        .split_once('.')
        .ok_or_else(|| format!("Port reference '{}' is not of the form 'node.field'", reference))?;
    let node = keys
        .get(key)
        .ok_or_else(|| format!("Unknown node key '{}' in '{}'", key, reference))?;
    Ok(PortId::new(*node, field))
}

fn print_graph(graph: &NodeGraph) {
    println!("Graph '{}'", graph.name);
    let names: AHashMap<NodeId, String> = graph
        .nodes()
        .map(|n| (n.id(), n.name.clone()))
        .collect();

    for id in graph.node_ids() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        println!(
            "\n[{}] {} ({}) at ({}, {})",
            node.id(),
            node.name,
            node.type_name(),
            node.position.x,
            node.position.y
        );
        let ports: Vec<PortId> = node.ports().map(NodePort::id).collect();

        for port_id in ports {
            let Some(port) = graph.port(&port_id) else {
                continue;
            };
            let direction = port.direction().to_string();
            let value_type = port.value_type().to_string();
            let value = if port.is_output() {
                graph.output_value(&port_id)
            } else {
                graph.input_value(&port_id)
            };
            println!(
                "  {:<6} {:<10} {:<7} = {}",
                direction, port_id.field, value_type, value
            );

            for (index, target) in graph.connections(&port_id).into_iter().enumerate() {
                let target_name = names
                    .get(&target.node)
                    .map(String::as_str)
                    .unwrap_or("?");
                let reroutes = graph
                    .reroute_points(&port_id, index)
                    .map_or(0, <[Vec2]>::len);
                if reroutes > 0 {
                    println!(
                        "           -> {}.{} ({} reroute points)",
                        target_name, target.field, reroutes
                    );
                } else {
                    println!("           -> {}.{}", target_name, target.field);
                }
            }
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
