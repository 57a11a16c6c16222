//! Domain models for functions and their published versions

pub mod function;
pub mod version;

pub use function::{FunctionDefinition, FunctionName, FunctionVersion};
pub use version::Version;
