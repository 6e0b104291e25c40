//! Tool system.
//!
//! Tools are deterministic capabilities invoked by name. Each declares an
//! ordered parameter schema and returns a structured result plus a short
//! human-readable rendering.

pub mod builtin;
pub mod extract;

mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{
    ExecutionContext, ParamKind, ParameterSpec, Tool, ToolDescriptor, ToolError, ToolOutput,
};
