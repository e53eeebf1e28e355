//! Float Math node implementation
//!
//! - mod.rs: node metadata, socket query and factory implementation
//! - operation.rs: the enumerated operation and its persisted identifiers
//! - parameters.rs: operation accessors and the draw hook

mod operation;
pub mod parameters;

pub use operation::*;
pub use parameters::*;

use egui::Color32;

use crate::constants;
use crate::nodes::interface::{NodeLayout, ParameterChange};
use crate::nodes::{DataType, Node, NodeCategory, NodeFactory, NodeMetadata, PortDefinition};

/// Float Math node: two float inputs, one float output and a selectable operation
#[derive(Default)]
pub struct FloatMathNodeFactory;

impl FloatMathNodeFactory {
    /// Socket signature `(inputs, outputs)`. Independent of instance state.
    pub fn sockets() -> (Vec<PortDefinition>, Vec<PortDefinition>) {
        (
            vec![
                PortDefinition::required("A", DataType::Float).with_description("First operand"),
                PortDefinition::required("B", DataType::Float).with_description("Second operand"),
            ],
            vec![PortDefinition::required("Result", DataType::Float)
                .with_description("Result of the selected operation")],
        )
    }
}

impl NodeFactory for FloatMathNodeFactory {
    fn metadata() -> NodeMetadata {
        let (inputs, outputs) = Self::sockets();

        NodeMetadata::new(
            constants::node::FLOAT_MATH,
            "Float Math",
            NodeCategory::math(),
            "Combines two float values with the selected operation",
        )
        .with_color(Color32::from_rgb(45, 55, 65))
        .with_icon("🧮")
        .with_inputs(inputs)
        .with_outputs(outputs)
        .with_properties(vec![FloatMathNode::operation_property().clone()])
        .with_tags(vec!["math", "float", "arithmetic"])
    }

    fn draw(node: &Node, layout: &mut dyn NodeLayout) -> Vec<ParameterChange> {
        FloatMathNode::draw(node, layout)
    }
}
