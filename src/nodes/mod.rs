//! Node system - core data structures and the function node implementations

// Core node system modules
pub mod factory;
pub mod graph;
pub mod interface;
pub mod node;
pub mod port;
pub mod property;

// Node implementations
pub mod math;

// Re-export core types
pub use graph::{Connection, ConnectionError, NodeGraph};
pub use node::{Node, NodeId};
pub use port::{Port, PortId, PortType};

// Re-export factory types
pub use factory::{
    DataType, NodeCategory, NodeFactory, NodeMetadata, NodeRegistry, PortDefinition, RegistryError,
};

// Re-export interface types
pub use interface::{EguiLayout, NodeData, NodeLayout, ParameterChange};
pub use property::{EnumItem, EnumProperty, PropertyDefinition};
