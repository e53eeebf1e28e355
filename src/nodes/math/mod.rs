//! Math operation nodes

pub mod float_math;
