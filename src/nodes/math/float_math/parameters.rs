//! Float Math node parameters and body drawing

use once_cell::sync::Lazy;

use super::operation::FloatMathOperation;
use crate::nodes::interface::{NodeData, NodeLayout, ParameterChange};
use crate::nodes::property::{EnumProperty, PropertyDefinition};
use crate::nodes::Node;

/// Parameter key of the operation property
pub const OPERATION: &str = "operation";

static OPERATION_PROPERTY: Lazy<PropertyDefinition> =
    Lazy::new(|| PropertyDefinition::from_enum::<FloatMathOperation>(OPERATION, "Operation"));

/// Accessors for the parameters of a Float Math node instance
pub struct FloatMathNode;

impl FloatMathNode {
    /// Schema of the operation property
    pub fn operation_property() -> &'static PropertyDefinition {
        &OPERATION_PROPERTY
    }

    /// The node's operation. Missing or unknown values read as the default.
    pub fn operation(node: &Node) -> FloatMathOperation {
        node.parameter(OPERATION)
            .and_then(NodeData::as_enum)
            .and_then(FloatMathOperation::from_identifier)
            .unwrap_or_default()
    }

    /// Set the node's operation
    pub fn set_operation(node: &mut Node, operation: FloatMathOperation) {
        node.set_parameter(OPERATION, NodeData::Enum(operation.identifier().to_string()));
    }

    /// Draws the operation dropdown, without a label
    pub fn draw(node: &Node, layout: &mut dyn NodeLayout) -> Vec<ParameterChange> {
        layout
            .prop_enum(node, Self::operation_property(), "")
            .into_iter()
            .collect()
    }
}
