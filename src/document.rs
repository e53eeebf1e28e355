//! Saving and loading node graphs
//!
//! Documents are JSON. Node types and enum values are stored by their stable
//! identifiers, so renaming a label never breaks an existing file.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::nodes::{
    ConnectionError, NodeData, NodeGraph, NodeId, NodeRegistry, Port, PortDefinition, PortType,
};

/// Save file data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: String,
    pub metadata: SaveMetadata,
    pub root_graph: NodeGraph,
}

/// Metadata for save files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub created: String,  // ISO 8601 timestamp
    pub modified: String, // ISO 8601 timestamp
    pub creator: String,
    pub description: String,
}

impl SaveData {
    /// Wrap a graph with fresh metadata
    pub fn new(graph: &NodeGraph) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: constants::document::VERSION.to_string(),
            metadata: SaveMetadata {
                created: now.clone(),
                modified: now,
                creator: constants::document::CREATOR.to_string(),
                description: "Node graph with function nodes".to_string(),
            },
            root_graph: graph.clone(),
        }
    }
}

/// Errors raised while saving or loading a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse document: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported document version `{0}`")]
    UnsupportedVersion(String),
    #[error("node {node} has unregistered type `{node_type}`")]
    UnknownNodeType { node: NodeId, node_type: String },
    #[error("node {node} parameter `{parameter}` holds illegal value {value:?}")]
    InvalidParameter {
        node: NodeId,
        parameter: String,
        value: NodeData,
    },
    #[error("node {node} sockets do not match node type `{node_type}`")]
    SocketMismatch { node: NodeId, node_type: String },
    #[error("node stored under key {key} claims id {id}")]
    NodeIdMismatch { key: NodeId, id: NodeId },
    #[error("connection {index} is invalid: {source}")]
    InvalidConnection {
        index: usize,
        #[source]
        source: ConnectionError,
    },
}

/// Serialize a graph to a JSON document
pub fn save_to_string(graph: &NodeGraph) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(&SaveData::new(graph)).map_err(DocumentError::Serialize)
}

/// Parse a JSON document and validate it against the registered node types
pub fn load_from_str(content: &str, registry: &NodeRegistry) -> Result<NodeGraph, DocumentError> {
    let save_data: SaveData = serde_json::from_str(content).map_err(DocumentError::Parse)?;

    if save_data.version != constants::document::VERSION {
        return Err(DocumentError::UnsupportedVersion(save_data.version));
    }

    let mut graph = save_data.root_graph;
    validate(&mut graph, registry)?;
    Ok(graph)
}

/// Save a graph to a file
pub fn save_to_file(path: &Path, graph: &NodeGraph) -> Result<(), DocumentError> {
    let content = save_to_string(graph)?;
    std::fs::write(path, content).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved {} nodes to {}", graph.nodes.len(), path.display());
    Ok(())
}

/// Load a graph from a file
pub fn load_from_file(path: &Path, registry: &NodeRegistry) -> Result<NodeGraph, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = load_from_str(&content, registry)?;
    info!("Loaded {} nodes from {}", graph.nodes.len(), path.display());
    Ok(graph)
}

/// Every node type must be registered, every node's sockets must match its
/// type and every declared property must hold a legal value. Properties
/// missing from older documents get their default. Connections go through
/// the same checks as [`NodeGraph::add_connection`].
fn validate(graph: &mut NodeGraph, registry: &NodeRegistry) -> Result<(), DocumentError> {
    for (&key, node) in graph.nodes.iter_mut() {
        if node.id != key {
            return Err(DocumentError::NodeIdMismatch { key, id: node.id });
        }

        let metadata = registry
            .get_metadata(&node.node_type)
            .ok_or_else(|| DocumentError::UnknownNodeType {
                node: node.id,
                node_type: node.node_type.clone(),
            })?;

        if !ports_match(&node.inputs, &metadata.inputs, PortType::Input)
            || !ports_match(&node.outputs, &metadata.outputs, PortType::Output)
        {
            return Err(DocumentError::SocketMismatch {
                node: node.id,
                node_type: node.node_type.clone(),
            });
        }

        for property in &metadata.properties {
            match node.parameter(property.identifier) {
                Some(value) if property.accepts(value) => {}
                Some(value) => {
                    return Err(DocumentError::InvalidParameter {
                        node: node.id,
                        parameter: property.identifier.to_string(),
                        value: value.clone(),
                    });
                }
                None => {
                    debug!(
                        "Node {} missing parameter '{}', using default",
                        node.id, property.identifier
                    );
                    node.set_parameter(property.identifier, property.default_value());
                }
            }
        }
    }

    graph.update_all_port_positions();
    graph.sync_next_node_id();

    let connections = std::mem::take(&mut graph.connections);
    for (index, connection) in connections.into_iter().enumerate() {
        graph
            .add_connection(connection)
            .map_err(|source| DocumentError::InvalidConnection { index, source })?;
    }
    Ok(())
}

fn ports_match(ports: &[Port], definitions: &[PortDefinition], port_type: PortType) -> bool {
    ports.len() == definitions.len()
        && ports.iter().zip(definitions).enumerate().all(|(index, (port, definition))| {
            port.id == index
                && port.port_type == port_type
                && port.name == definition.name
                && port.data_type == definition.data_type
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::math::float_math::{
        FloatMathNode, FloatMathNodeFactory, FloatMathOperation, OPERATION,
    };
    use crate::nodes::{Connection, NodeFactory};
    use egui::Pos2;

    fn registry() -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.register::<FloatMathNodeFactory>().unwrap();
        registry
    }

    #[test]
    fn test_round_trip_keeps_operation() {
        let registry = registry();
        let mut graph = NodeGraph::new();
        let a = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::ZERO);
        let b = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::new(0.0, 100.0));
        graph.add_connection(Connection::new(a, 0, b, 1)).unwrap();
        if let Some(node) = graph.nodes.get_mut(&a) {
            FloatMathNode::set_operation(node, FloatMathOperation::Min);
        }

        let json = save_to_string(&graph).unwrap();
        assert!(json.contains("\"MIN\""));
        assert!(!json.contains("Minimum"));

        let restored = load_from_str(&json, &registry).unwrap();
        assert_eq!(restored, graph);
        assert_eq!(FloatMathNode::operation(&restored.nodes[&a]), FloatMathOperation::Min);
        assert_eq!(FloatMathNode::operation(&restored.nodes[&b]), FloatMathOperation::Add);
    }

    #[test]
    fn test_missing_operation_gets_default() {
        let registry = registry();
        let mut graph = NodeGraph::new();
        let id = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::ZERO);
        if let Some(node) = graph.nodes.get_mut(&id) {
            node.parameters.clear();
        }

        let restored = load_from_str(&save_to_string(&graph).unwrap(), &registry).unwrap();
        assert_eq!(
            restored.nodes[&id].parameter(OPERATION),
            Some(&NodeData::Enum("ADD".to_string()))
        );
    }

    #[test]
    fn test_illegal_operation_rejected() {
        let registry = registry();
        let mut graph = NodeGraph::new();
        let id = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::ZERO);
        if let Some(node) = graph.nodes.get_mut(&id) {
            node.set_parameter(OPERATION, NodeData::Enum("Minimum".to_string()));
        }

        let err = load_from_str(&save_to_string(&graph).unwrap(), &registry).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidParameter { node: 0, .. }));
    }

    #[test]
    fn test_unknown_node_type_rejected() {
        let graph = {
            let mut graph = NodeGraph::new();
            FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::ZERO);
            graph
        };
        let json = save_to_string(&graph).unwrap();

        let err = load_from_str(&json, &NodeRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnknownNodeType { node_type, .. } if node_type == "fn_FloatMathNode"
        ));
    }

    #[test]
    fn test_version_and_parse_errors() {
        let registry = registry();
        let mut data = SaveData::new(&NodeGraph::new());
        data.version = "9.9".to_string();
        let json = serde_json::to_string(&data).unwrap();

        assert!(matches!(
            load_from_str(&json, &registry),
            Err(DocumentError::UnsupportedVersion(v)) if v == "9.9"
        ));
        assert!(matches!(load_from_str("{", &registry), Err(DocumentError::Parse(_))));
    }

    /// A saved two-node graph with a link from the first output into the
    /// second node's `A` input, as an editable JSON value
    fn saved_pair() -> serde_json::Value {
        let mut graph = NodeGraph::new();
        let a = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::ZERO);
        let b = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::new(0.0, 100.0));
        graph.add_connection(Connection::new(a, 0, b, 0)).unwrap();
        serde_json::from_str(&save_to_string(&graph).unwrap()).unwrap()
    }

    fn load_value(value: &serde_json::Value) -> Result<NodeGraph, DocumentError> {
        load_from_str(&value.to_string(), &registry())
    }

    #[test]
    fn test_tampered_sockets_rejected() {
        let mut retyped = saved_pair();
        retyped["root_graph"]["nodes"]["0"]["inputs"][0]["data_type"] = "fn_VectorSocket".into();
        let mut renamed = saved_pair();
        renamed["root_graph"]["nodes"]["0"]["inputs"][1]["name"] = "Z".into();
        let mut missing = saved_pair();
        missing["root_graph"]["nodes"]["1"]["outputs"] = serde_json::json!([]);

        for value in [retyped, renamed, missing] {
            let err = load_value(&value).unwrap_err();
            assert!(matches!(
                err,
                DocumentError::SocketMismatch { node_type, .. } if node_type == "fn_FloatMathNode"
            ));
        }
    }

    #[test]
    fn test_port_positions_recomputed() {
        let mut value = saved_pair();
        let input = &mut value["root_graph"]["nodes"]["0"]["inputs"][0];
        input["position"] = serde_json::json!([-500.0, 9.0]);

        let restored = load_value(&value).unwrap();
        let mut expected = restored.nodes[&0].clone();
        expected.update_port_positions();
        assert_eq!(restored.nodes[&0], expected);
    }

    #[test]
    fn test_stale_next_node_id_is_raised() {
        let mut value = saved_pair();
        value["root_graph"]["next_node_id"] = 0.into();

        let mut restored = load_value(&value).unwrap();
        let id = FloatMathNodeFactory::add_to_graph(&mut restored, Pos2::ZERO);
        assert_eq!(id, 2);
        assert_eq!(restored.nodes.len(), 3);
    }

    #[test]
    fn test_node_id_must_match_key() {
        let mut value = saved_pair();
        value["root_graph"]["nodes"]["1"]["id"] = 0.into();

        assert!(matches!(
            load_value(&value),
            Err(DocumentError::NodeIdMismatch { key: 1, id: 0 })
        ));
    }

    #[test]
    fn test_invalid_connections_rejected() {
        let mut dangling = saved_pair();
        dangling["root_graph"]["connections"][0]["to_node"] = 42.into();
        assert!(matches!(
            load_value(&dangling),
            Err(DocumentError::InvalidConnection {
                index: 0,
                source: ConnectionError::MissingNode(42)
            })
        ));

        let mut bad_port = saved_pair();
        bad_port["root_graph"]["connections"][0]["from_port"] = 3.into();
        assert!(matches!(
            load_value(&bad_port),
            Err(DocumentError::InvalidConnection {
                index: 0,
                source: ConnectionError::MissingOutput { node: 0, port: 3 }
            })
        ));

        let mut doubled = saved_pair();
        let link = doubled["root_graph"]["connections"][0].clone();
        if let Some(connections) = doubled["root_graph"]["connections"].as_array_mut() {
            connections.push(link);
        }
        assert!(matches!(
            load_value(&doubled),
            Err(DocumentError::InvalidConnection {
                index: 1,
                source: ConnectionError::InputOccupied { node: 1, port: 0 }
            })
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let registry = registry();
        let mut graph = NodeGraph::new();
        let id = FloatMathNodeFactory::add_to_graph(&mut graph, Pos2::ZERO);
        if let Some(node) = graph.nodes.get_mut(&id) {
            FloatMathNode::set_operation(node, FloatMathOperation::Max);
        }

        let path = std::env::temp_dir().join(format!("function_nodes_{}.json", std::process::id()));
        save_to_file(&path, &graph).unwrap();
        let restored = load_from_file(&path, &registry);
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            FloatMathNode::operation(&restored.unwrap().nodes[&id]),
            FloatMathOperation::Max
        );
        assert!(matches!(
            load_from_file(&path, &registry),
            Err(DocumentError::Io { .. })
        ));
    }
}
