//! Definition file parsing and the filesystem loader

#![allow(clippy::result_large_err)]

use crate::errors::{definition_error, Result};
use crate::function_def::template::{expand_template, Lookup};
use fnroll_core::{ExError, FunctionDefinition, FunctionLoader};
use std::fs;
use std::path::Path;

/// Serialization format of a definition file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionFileFormat {
    Json,
    Yaml,
}

impl FunctionFileFormat {
    /// `.yaml` / `.yml` are YAML; everything else is read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Parse already-expanded definition content
pub fn parse_function_definition(
    content: &str,
    format: FunctionFileFormat,
) -> Result<FunctionDefinition> {
    match format {
        FunctionFileFormat::Json => serde_json::from_str(content)
            .map_err(|e| definition_error(format!("JSON parse error: {}", e))),
        FunctionFileFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| definition_error(format!("YAML parse error: {}", e))),
    }
}


/// Loads definitions from disk, expanding templates against the environment
pub struct FileFunctionLoader {
    env: Box<Lookup>,
}

impl FileFunctionLoader {
    /// Loader reading variables from the process environment
    pub fn new() -> Self {
        Self {
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Loader resolving variables through `lookup` instead of the process environment
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env: Box::new(lookup),
        }
    }

    /// Read and expand a definition file without parsing it
    pub fn read_expanded(&self, path: &Path) -> Result<String> {
        let raw = fs::read_to_string(path).map_err(|e| {
            definition_error(format!(
                "failed to read function file {}: {}",
                path.display(),
                e
            ))
        })?;
        expand_template(&raw, &*self.env)
    }
}

impl Default for FileFunctionLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionLoader for FileFunctionLoader {
    fn load_function(&self, path: &Path) -> std::result::Result<FunctionDefinition, ExError> {
        let content = self.read_expanded(path)?;
        let definition = parse_function_definition(&content, FunctionFileFormat::from_path(path))?;
        tracing::debug!(
            path = %path.display(),
            function_name = definition.function_name.as_str(),
            "loaded function definition"
        );
        Ok(definition)
    }
}
