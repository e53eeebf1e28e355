//! Node instances placed in a graph

use std::collections::BTreeMap;

use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use super::factory::DataType;
use super::interface::NodeData;
use super::port::{pos2_serde, Port, PortId, PortType};
use crate::constants;

/// Unique identifier for a node
pub type NodeId = usize;

/// A node instance: the per-document state of one placed node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Identifier of the node type this instance was created from
    pub node_type: String,
    pub title: String,
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
    #[serde(with = "vec2_serde")]
    pub size: Vec2,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    #[serde(with = "color32_serde")]
    pub color: Color32,
    /// Property values keyed by property identifier
    #[serde(default)]
    pub parameters: BTreeMap<String, NodeData>,
}

impl Node {
    /// Creates a new node with the specified properties
    pub fn new(
        id: NodeId,
        node_type: impl Into<String>,
        title: impl Into<String>,
        position: Pos2,
    ) -> Self {
        let [width, height] = constants::node::DEFAULT_SIZE;
        Self {
            id,
            node_type: node_type.into(),
            title: title.into(),
            position,
            size: Vec2::new(width, height),
            inputs: vec![],
            outputs: vec![],
            color: Color32::from_rgb(60, 60, 60),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds an input port to the node
    pub fn add_input(&mut self, name: impl Into<String>, data_type: DataType) -> &mut Self {
        let port_id = self.inputs.len();
        self.inputs.push(Port::new(port_id, name, PortType::Input, data_type));
        self
    }

    /// Adds an output port to the node
    pub fn add_output(&mut self, name: impl Into<String>, data_type: DataType) -> &mut Self {
        let port_id = self.outputs.len();
        self.outputs.push(Port::new(port_id, name, PortType::Output, data_type));
        self
    }

    pub fn input(&self, port: PortId) -> Option<&Port> {
        self.inputs.get(port)
    }

    pub fn output(&self, port: PortId) -> Option<&Port> {
        self.outputs.get(port)
    }

    /// Updates the positions of all ports based on the node's position and size
    pub fn update_port_positions(&mut self) {
        let port_spacing = constants::node::PORT_SPACING;

        // Input ports on TOP of node
        let input_start_x = if self.inputs.len() > 1 {
            (self.size.x - (self.inputs.len() - 1) as f32 * port_spacing) / 2.0
        } else {
            self.size.x / 2.0
        };

        for (i, input) in self.inputs.iter_mut().enumerate() {
            input.position =
                self.position + Vec2::new(input_start_x + i as f32 * port_spacing, 0.0);
        }

        // Output ports on BOTTOM of node
        let output_start_x = if self.outputs.len() > 1 {
            (self.size.x - (self.outputs.len() - 1) as f32 * port_spacing) / 2.0
        } else {
            self.size.x / 2.0
        };

        for (i, output) in self.outputs.iter_mut().enumerate() {
            output.position =
                self.position + Vec2::new(output_start_x + i as f32 * port_spacing, self.size.y);
        }
    }

    /// Sets the color of the node
    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    /// Sets the size of the node
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Current value of a parameter
    pub fn parameter(&self, name: &str) -> Option<&NodeData> {
        self.parameters.get(name)
    }

    /// Set a parameter, returning the previous value
    pub fn set_parameter(&mut self, name: impl Into<String>, value: NodeData) -> Option<NodeData> {
        self.parameters.insert(name.into(), value)
    }
}

// Serde helper modules for egui types
mod vec2_serde {
    use egui::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(vec: &Vec2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [vec.x, vec.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Vec2::new(x, y))
    }
}

mod color32_serde {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [color.r(), color.g(), color.b(), color.a()].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [r, g, b, a] = <[u8; 4]>::deserialize(deserializer)?;
        Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}
