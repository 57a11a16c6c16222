//! Function definition loading interface

use crate::errors::ExError;
use crate::model::FunctionDefinition;
use std::path::Path;

/// Loads the function definition a rollback operates on
pub trait FunctionLoader {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expanded or parsed.
    fn load_function(&self, path: &Path) -> Result<FunctionDefinition, ExError>;
}
