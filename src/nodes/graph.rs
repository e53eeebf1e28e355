//! Node graph data structures and operations

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::factory::DataType;
use super::node::{Node, NodeId};
use super::port::PortId;

/// Represents a connection between two ports on different nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from_node: NodeId,
    pub from_port: PortId,
    pub to_node: NodeId,
    pub to_port: PortId,
}

impl Connection {
    /// Creates a new connection
    pub fn new(from_node: NodeId, from_port: PortId, to_node: NodeId, to_port: PortId) -> Self {
        Self {
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }
}

/// Reasons a connection is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("cannot connect a node to itself")]
    SelfConnection,
    #[error("node {0} does not exist")]
    MissingNode(NodeId),
    #[error("node {node} has no output port {port}")]
    MissingOutput { node: NodeId, port: PortId },
    #[error("node {node} has no input port {port}")]
    MissingInput { node: NodeId, port: PortId },
    #[error("cannot connect {from} output to {to} input")]
    IncompatibleTypes { from: &'static str, to: &'static str },
    #[error("input port {port} of node {node} is already connected")]
    InputOccupied { node: NodeId, port: PortId },
}

/// A graph containing nodes and their connections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub connections: Vec<Connection>,
    next_node_id: NodeId,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the graph and returns its ID
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        node.id = id;
        self.nodes.insert(id, node);
        self.next_node_id += 1;
        id
    }

    /// Removes a node and all its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections
            .retain(|conn| conn.from_node != node_id && conn.to_node != node_id);
        self.nodes.remove(&node_id)
    }

    /// Adds a connection between two ports
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), ConnectionError> {
        if connection.from_node == connection.to_node {
            return Err(ConnectionError::SelfConnection);
        }

        let from_type = self.output_type(connection.from_node, connection.from_port)?;
        let to_type = self.input_type(connection.to_node, connection.to_port)?;

        if !from_type.can_connect_to(&to_type) {
            return Err(ConnectionError::IncompatibleTypes {
                from: from_type.name(),
                to: to_type.name(),
            });
        }

        // Inputs take a single link
        if self
            .connections
            .iter()
            .any(|c| c.to_node == connection.to_node && c.to_port == connection.to_port)
        {
            return Err(ConnectionError::InputOccupied {
                node: connection.to_node,
                port: connection.to_port,
            });
        }

        debug!(
            "Connected {}:{} -> {}:{}",
            connection.from_node, connection.from_port, connection.to_node, connection.to_port
        );
        self.connections.push(connection);
        Ok(())
    }

    /// Removes a connection by index
    pub fn remove_connection(&mut self, index: usize) -> Option<Connection> {
        if index < self.connections.len() {
            Some(self.connections.remove(index))
        } else {
            None
        }
    }

    /// Updates port positions for all nodes
    pub fn update_all_port_positions(&mut self) {
        for node in self.nodes.values_mut() {
            node.update_port_positions();
        }
    }

    /// Move the id counter past every existing node
    pub fn sync_next_node_id(&mut self) {
        if let Some(&last) = self.nodes.keys().next_back() {
            if last >= self.next_node_id {
                self.next_node_id = last + 1;
            }
        }
    }

    /// Nodes created from the given node type
    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |node| node.node_type == node_type)
    }

    fn output_type(&self, node_id: NodeId, port: PortId) -> Result<DataType, ConnectionError> {
        let node = self.nodes.get(&node_id).ok_or(ConnectionError::MissingNode(node_id))?;
        node.output(port)
            .map(|p| p.data_type)
            .ok_or(ConnectionError::MissingOutput { node: node_id, port })
    }

    fn input_type(&self, node_id: NodeId, port: PortId) -> Result<DataType, ConnectionError> {
        let node = self.nodes.get(&node_id).ok_or(ConnectionError::MissingNode(node_id))?;
        node.input(port)
            .map(|p| p.data_type)
            .ok_or(ConnectionError::MissingInput { node: node_id, port })
    }
}
