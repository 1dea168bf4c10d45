//! Sandboxed tools offered to the model.

pub mod base;
pub mod filesystem;
pub mod python;
pub mod registry;
pub mod sandbox;

pub use base::{parse_args, Tool};
pub use filesystem::{ListDirectoryTool, ReadFileTool, WriteFileTool};
pub use python::RunPythonFileTool;
pub use registry::ToolRegistry;
pub use sandbox::Sandbox;
