//! Stable identifiers and default values shared across the function nodes
//!
//! Identifiers in this module end up in saved documents. Changing one breaks
//! every document that references it.

/// Node type identifiers
pub mod node {
    /// Stable identifier of the Float Math node type
    pub const FLOAT_MATH: &str = "fn_FloatMathNode";

    /// Default node size (width, height)
    pub const DEFAULT_SIZE: [f32; 2] = [150.0, 30.0];

    /// Horizontal spacing between ports on a node edge
    pub const PORT_SPACING: f32 = 30.0;
}

/// Socket type identifiers
pub mod socket {
    pub const FLOAT: &str = "fn_FloatSocket";
    pub const VECTOR: &str = "fn_VectorSocket";
    pub const BOOLEAN: &str = "fn_BooleanSocket";
    pub const ANY: &str = "fn_AnySocket";
}

/// Save file constants
pub mod document {
    /// Current save format version
    pub const VERSION: &str = "1.0";

    /// Creator string written into save metadata
    pub const CREATOR: &str = "Nōdle Function Nodes 0.1";
}

/// Plugin constants
pub mod plugin {
    /// Name of the built-in function node plugin
    pub const FUNCTION_NODES: &str = "function_nodes";

    /// Host version plugins are checked against
    pub const HOST_VERSION: &str = "0.1.0";
}
