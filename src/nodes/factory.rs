//! Node factory system with explicit registration and rich metadata

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};

use egui::{Color32, Pos2, Vec2};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::nodes::interface::{self, NodeLayout, ParameterChange};
use crate::nodes::property::PropertyDefinition;
use crate::nodes::{Node, NodeGraph, NodeId};

/// Socket types that can flow through ports
///
/// Serialized by the stable socket identifier so saved documents survive
/// display-name changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Scalar floating point number
    #[serde(rename = "fn_FloatSocket")]
    Float,
    /// 3D vector (x, y, z)
    #[serde(rename = "fn_VectorSocket")]
    Vector3,
    /// Boolean value
    #[serde(rename = "fn_BooleanSocket")]
    Boolean,
    /// Any type (for generic ports)
    #[serde(rename = "fn_AnySocket")]
    Any,
}

impl DataType {
    /// Check if this data type can connect to another
    pub fn can_connect_to(&self, other: &DataType) -> bool {
        self == other || *self == DataType::Any || *other == DataType::Any
    }

    /// Stable socket identifier used for serialization
    pub fn idname(&self) -> &'static str {
        match self {
            DataType::Float => constants::socket::FLOAT,
            DataType::Vector3 => constants::socket::VECTOR,
            DataType::Boolean => constants::socket::BOOLEAN,
            DataType::Any => constants::socket::ANY,
        }
    }

    /// Look up a data type by its socket identifier
    pub fn from_idname(idname: &str) -> Option<DataType> {
        [DataType::Float, DataType::Vector3, DataType::Boolean, DataType::Any]
            .into_iter()
            .find(|data_type| data_type.idname() == idname)
    }

    /// Get a human-readable name for this data type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Float => "Float",
            DataType::Vector3 => "Vector3",
            DataType::Boolean => "Boolean",
            DataType::Any => "Any",
        }
    }

    /// Get a color representing this data type
    pub fn color(&self) -> Color32 {
        match self {
            DataType::Float => Color32::from_rgb(100, 150, 255), // Blue
            DataType::Vector3 => Color32::from_rgb(255, 100, 100), // Red
            DataType::Boolean => Color32::from_rgb(255, 100, 255), // Magenta
            DataType::Any => Color32::from_rgb(150, 150, 150), // Gray
        }
    }
}

/// Hierarchical category system for organizing nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCategory {
    path: Vec<String>,
}

impl NodeCategory {
    /// Create a new category from path components
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Get the category name (last component)
    pub fn name(&self) -> &str {
        self.path.last().map(|s| s.as_str()).unwrap_or("")
    }

    /// Get the parent category
    pub fn parent(&self) -> Option<NodeCategory> {
        if self.path.len() > 1 {
            Some(NodeCategory {
                path: self.path[..self.path.len() - 1].to_vec(),
            })
        } else {
            None
        }
    }

    /// Check if this category is a child of another
    pub fn is_child_of(&self, other: &NodeCategory) -> bool {
        self.path.len() > other.path.len() && self.path[..other.path.len()] == other.path
    }

    /// Get display string for UI
    pub fn display_string(&self) -> String {
        self.path.join(" > ")
    }

    /// Get standard math category
    pub fn math() -> Self {
        Self::new(&["Math"])
    }
}

/// Socket descriptor for one input or output of a node type
#[derive(Debug, Clone, PartialEq)]
pub struct PortDefinition {
    pub name: String,
    pub data_type: DataType,
    pub optional: bool,
    pub description: Option<String>,
}

impl PortDefinition {
    /// Create a required port
    pub fn required(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            optional: false,
            description: None,
        }
    }

    /// Create an optional port
    pub fn optional(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            optional: true,
            description: None,
        }
    }

    /// Add description to port
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// The `(socket identifier, port name)` pair the host wires against
    pub fn socket(&self) -> (&'static str, &str) {
        (self.data_type.idname(), &self.name)
    }
}

/// Schema descriptor for a node type - the single source of truth the
/// registry works from
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    // Core identity
    /// Stable identifier, used as the serialization key
    pub node_type: &'static str,
    /// Display label, safe to rename
    pub display_name: &'static str,
    pub description: &'static str,
    pub version: &'static str,

    // Visual appearance
    pub color: Color32,
    pub icon: &'static str,
    pub size_hint: Vec2,

    // Organization
    pub category: NodeCategory,
    pub tags: Vec<&'static str>,

    // Connectivity
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,

    // Per-instance properties persisted with the document
    pub properties: Vec<PropertyDefinition>,
}

impl NodeMetadata {
    /// Create node metadata with sensible defaults
    pub fn new(
        node_type: &'static str,
        display_name: &'static str,
        category: NodeCategory,
        description: &'static str,
    ) -> Self {
        Self {
            node_type,
            display_name,
            description,
            version: "1.0",

            color: Color32::from_rgb(100, 100, 100),
            icon: "⚡",
            size_hint: Vec2::from(constants::node::DEFAULT_SIZE),

            category,
            tags: vec![],

            inputs: vec![],
            outputs: vec![],

            properties: vec![],
        }
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortDefinition>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_properties(mut self, properties: Vec<PropertyDefinition>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_tags(mut self, tags: Vec<&'static str>) -> Self {
        self.tags = tags;
        self
    }

    /// Find a property definition by identifier
    pub fn property(&self, identifier: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.identifier == identifier)
    }
}

/// Node factory trait: a node type is a plain schema plus a draw hook
pub trait NodeFactory {
    /// Get comprehensive node metadata
    fn metadata() -> NodeMetadata
    where
        Self: Sized;

    /// Create a node instance at the given position
    fn create(position: Pos2) -> Node
    where
        Self: Sized,
    {
        let meta = Self::metadata();
        let mut node = Node::new(0, meta.node_type, meta.display_name, position)
            .with_color(meta.color)
            .with_size(meta.size_hint);

        for input in &meta.inputs {
            node.add_input(&input.name, input.data_type);
        }

        for output in &meta.outputs {
            node.add_output(&output.name, output.data_type);
        }

        for property in &meta.properties {
            node.set_parameter(property.identifier, property.default_value());
        }

        node.update_port_positions();
        node
    }

    /// Draw the node body. Returns the parameter changes the widgets produced.
    fn draw(_node: &Node, _layout: &mut dyn NodeLayout) -> Vec<ParameterChange>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Add this node to a graph
    fn add_to_graph(graph: &mut NodeGraph, position: Pos2) -> NodeId
    where
        Self: Sized,
    {
        graph.add_node(Self::create(position))
    }
}

/// Errors raised by [`NodeRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("node type `{0}` is already registered by a different factory")]
    DuplicateNodeType(String),
    #[error("node type `{0}` is not registered")]
    UnknownNodeType(String),
}

type NodeCreator = fn(Pos2) -> Node;
type MetadataProvider = fn() -> NodeMetadata;
type NodeDrawer = fn(&Node, &mut dyn NodeLayout) -> Vec<ParameterChange>;

struct RegisteredFactory {
    factory_type: TypeId,
    create: NodeCreator,
    metadata: MetadataProvider,
    draw: NodeDrawer,
}

/// Registry for managing node factories
pub struct NodeRegistry {
    factories: BTreeMap<String, RegisteredFactory>,
    categories: HashMap<NodeCategory, Vec<String>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
            categories: HashMap::new(),
        }
    }

    /// Register a node factory
    ///
    /// Registering the same factory again is a no-op. Registering a different
    /// factory under an identifier that is already taken fails.
    pub fn register<T: NodeFactory + 'static>(&mut self) -> Result<(), RegistryError> {
        let metadata = T::metadata();
        let node_type = metadata.node_type.to_string();
        let factory_type = TypeId::of::<T>();

        if let Some(existing) = self.factories.get(&node_type) {
            if existing.factory_type == factory_type {
                debug!("Node type {} already registered, skipping", node_type);
                return Ok(());
            }
            return Err(RegistryError::DuplicateNodeType(node_type));
        }

        self.factories.insert(
            node_type.clone(),
            RegisteredFactory {
                factory_type,
                create: T::create,
                metadata: T::metadata,
                draw: T::draw,
            },
        );

        info!(
            "Registered node type {} ({}) in {}",
            node_type,
            metadata.display_name,
            metadata.category.display_string()
        );

        self.categories
            .entry(metadata.category)
            .or_default()
            .push(node_type);

        Ok(())
    }

    /// Remove a node type, returning its metadata
    pub fn unregister(&mut self, node_type: &str) -> Result<NodeMetadata, RegistryError> {
        let factory = self
            .factories
            .remove(node_type)
            .ok_or_else(|| RegistryError::UnknownNodeType(node_type.to_string()))?;
        let metadata = (factory.metadata)();

        if let Some(types) = self.categories.get_mut(&metadata.category) {
            types.retain(|t| t != node_type);
            if types.is_empty() {
                self.categories.remove(&metadata.category);
            }
        }

        info!("Unregistered node type {}", node_type);
        Ok(metadata)
    }

    /// Create a node by type identifier
    pub fn create_node(&self, node_type: &str, position: Pos2) -> Option<Node> {
        let factory = self.factories.get(node_type)?;
        debug!("Creating node {} at {:?}", node_type, position);
        Some((factory.create)(position))
    }

    /// Create a node and add it to a graph
    pub fn add_to_graph(
        &self,
        graph: &mut NodeGraph,
        node_type: &str,
        position: Pos2,
    ) -> Result<NodeId, RegistryError> {
        let node = self
            .create_node(node_type, position)
            .ok_or_else(|| RegistryError::UnknownNodeType(node_type.to_string()))?;
        Ok(graph.add_node(node))
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: &str) -> Option<NodeMetadata> {
        self.factories.get(node_type).map(|factory| (factory.metadata)())
    }

    /// Check if a node type is registered
    pub fn has_node_type(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// All registered node type identifiers, sorted
    pub fn node_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Node types registered in a category
    pub fn nodes_in_category(&self, category: &NodeCategory) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|types| types.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// All categories with at least one node type, sorted
    pub fn categories(&self) -> Vec<&NodeCategory> {
        let mut categories: Vec<&NodeCategory> = self.categories.keys().collect();
        categories.sort();
        categories
    }

    /// Draw a node's body through its factory's draw hook
    pub fn draw_node(
        &self,
        node: &Node,
        layout: &mut dyn NodeLayout,
    ) -> Result<Vec<ParameterChange>, RegistryError> {
        let factory = self
            .factories
            .get(&node.node_type)
            .ok_or_else(|| RegistryError::UnknownNodeType(node.node_type.clone()))?;
        Ok((factory.draw)(node, layout))
    }

    /// Apply parameter changes to a node, checked against its type's properties.
    /// Returns the number of changes applied.
    pub fn apply_changes(
        &self,
        node: &mut Node,
        changes: Vec<ParameterChange>,
    ) -> Result<usize, RegistryError> {
        let metadata = self
            .get_metadata(&node.node_type)
            .ok_or_else(|| RegistryError::UnknownNodeType(node.node_type.clone()))?;
        Ok(interface::apply_changes(node, &metadata.properties, changes))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SampleNode;

    impl NodeFactory for SampleNode {
        fn metadata() -> NodeMetadata {
            let category = NodeCategory::new(&["Test", "Sample"]);
            NodeMetadata::new("test_SampleNode", "Sample", category, "Test node")
                .with_inputs(vec![PortDefinition::required("In", DataType::Any)])
                .with_outputs(vec![PortDefinition::optional("Out", DataType::Boolean)])
        }
    }

    struct ImpostorNode;

    impl NodeFactory for ImpostorNode {
        fn metadata() -> NodeMetadata {
            NodeMetadata::new(
                "test_SampleNode",
                "Impostor",
                NodeCategory::math(),
                "Reuses an identifier",
            )
        }
    }

    #[test]
    fn test_data_type_connections() {
        assert!(DataType::Float.can_connect_to(&DataType::Float));
        assert!(DataType::Float.can_connect_to(&DataType::Any));
        assert!(DataType::Any.can_connect_to(&DataType::Boolean));
        assert!(!DataType::Float.can_connect_to(&DataType::Vector3));
    }

    #[test]
    fn test_data_type_idnames() {
        assert_eq!(DataType::Float.idname(), "fn_FloatSocket");
        assert_eq!(DataType::from_idname("fn_FloatSocket"), Some(DataType::Float));
        assert_eq!(DataType::from_idname("fn_Unknown"), None);
        assert_eq!(serde_json::to_string(&DataType::Float).unwrap(), "\"fn_FloatSocket\"");
    }

    #[test]
    fn test_hierarchical_categories() {
        let sample = NodeCategory::new(&["Test", "Sample"]);
        let root = NodeCategory::new(&["Test"]);

        assert!(sample.is_child_of(&root));
        assert!(!root.is_child_of(&sample));
        assert_eq!(sample.parent(), Some(root));
        assert_eq!(sample.name(), "Sample");
        assert_eq!(sample.display_string(), "Test > Sample");
        assert_eq!(NodeCategory::math().parent(), None);
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = NodeRegistry::new();
        registry.register::<SampleNode>().unwrap();

        assert!(registry.has_node_type("test_SampleNode"));
        assert_eq!(registry.node_types(), vec!["test_SampleNode"]);

        let node = registry.create_node("test_SampleNode", Pos2::new(10.0, 20.0)).unwrap();
        assert_eq!(node.node_type, "test_SampleNode");
        assert_eq!(node.title, "Sample");
        assert_eq!(node.inputs[0].data_type, DataType::Any);
        assert_eq!(node.outputs[0].data_type, DataType::Boolean);
        assert!(registry.create_node("missing", Pos2::ZERO).is_none());
    }

    #[test]
    fn test_register_same_factory_twice_is_noop() {
        let mut registry = NodeRegistry::new();
        registry.register::<SampleNode>().unwrap();
        registry.register::<SampleNode>().unwrap();

        assert_eq!(registry.node_types().len(), 1);
        let category = NodeCategory::new(&["Test", "Sample"]);
        assert_eq!(registry.nodes_in_category(&category), vec!["test_SampleNode"]);
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut registry = NodeRegistry::new();
        registry.register::<SampleNode>().unwrap();

        assert_eq!(
            registry.register::<ImpostorNode>(),
            Err(RegistryError::DuplicateNodeType("test_SampleNode".to_string()))
        );
        assert_eq!(registry.get_metadata("test_SampleNode").unwrap().display_name, "Sample");
    }

    #[test]
    fn test_unregister() {
        let mut registry = NodeRegistry::new();
        registry.register::<SampleNode>().unwrap();

        let metadata = registry.unregister("test_SampleNode").unwrap();
        assert_eq!(metadata.display_name, "Sample");
        assert!(!registry.has_node_type("test_SampleNode"));
        assert!(registry.categories().is_empty());
        assert_eq!(
            registry.unregister("test_SampleNode").unwrap_err(),
            RegistryError::UnknownNodeType("test_SampleNode".to_string())
        );

        // The identifier is free again
        registry.register::<ImpostorNode>().unwrap();
        assert_eq!(registry.get_metadata("test_SampleNode").unwrap().display_name, "Impostor");
    }

    #[test]
    fn test_default_draw_hook_draws_nothing() {
        struct NoWidgets;
        impl NodeLayout for NoWidgets {
            fn prop_enum(
                &mut self,
                _: &Node,
                _: &PropertyDefinition,
                _: &str,
            ) -> Option<ParameterChange> {
                panic!("no property widgets expected");
            }
            fn label(&mut self, _: &str) {
                panic!("no labels expected");
            }
        }

        let mut registry = NodeRegistry::new();
        registry.register::<SampleNode>().unwrap();
        let node = SampleNode::create(Pos2::ZERO);
        assert!(registry.draw_node(&node, &mut NoWidgets).unwrap().is_empty());
    }
}
