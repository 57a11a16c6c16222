//! Function definition files
//!
//! Provides:
//! - Template expansion (`env`, `must_env`) applied to the raw file
//! - JSON / YAML parsing into `FunctionDefinition`
//! - Content digest recorded with published versions
//! - `FileFunctionLoader`, the filesystem `FunctionLoader`

pub mod digest;
pub mod loader;
pub mod template;

pub use digest::compute_definition_digest;
pub use loader::{parse_function_definition, FileFunctionLoader, FunctionFileFormat};
pub use template::{expand_template, Lookup};
