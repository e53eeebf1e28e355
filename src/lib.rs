//! Nodle function nodes
//!
//! Node type declarations for the Nodle editor. Each node type is a plain
//! schema ([`nodes::NodeMetadata`]) plus a draw hook, registered explicitly
//! with a host-owned [`nodes::NodeRegistry`].

pub mod constants;
pub mod document;
pub mod nodes;
pub mod plugins;

// Re-export commonly used types
pub use nodes::math::float_math::{FloatMathNode, FloatMathNodeFactory, FloatMathOperation};
pub use nodes::{NodeData, NodeFactory, NodeGraph, NodeLayout, NodeRegistry, ParameterChange};
pub use plugins::{FunctionNodesPlugin, PluginManager};
