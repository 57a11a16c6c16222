//! Function identity, definitions and published version metadata

use crate::errors::{ExError, ExErrorKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name identifying a function within the version store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FunctionName(String);

impl FunctionName {
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty or whitespace-only name.
    pub fn new(name: impl Into<String>) -> Result<Self, ExError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("function_name")
                .with_message("function name cannot be empty"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FunctionName {
    type Error = ExError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FunctionName::new(s)
    }
}

impl From<FunctionName> for String {
    fn from(name: FunctionName) -> Self {
        name.0
    }
}

impl std::fmt::Display for FunctionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Function definition as loaded from a local definition file
///
/// Keys follow the provider's PascalCase convention. Settings this crate does
/// not interpret are kept in `extra` so a definition survives a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionDefinition {
    pub function_name: FunctionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Metadata of one published version as reported by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionVersion {
    pub function_name: String,
    /// Wire form of the version, as the store returned it
    pub version: String,
    pub description: Option<String>,
    pub runtime: Option<String>,
    pub code_sha256: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name_rejects_blank() {
        assert!(FunctionName::new("").is_err());
        assert!(FunctionName::new("   ").is_err());
        assert_eq!(FunctionName::new("hello").unwrap().as_str(), "hello");
    }

    #[test]
    fn test_definition_keeps_unknown_keys() {
        let json = r#"{
            "FunctionName": "hello",
            "Runtime": "provided.al2023",
            "MemorySize": 128,
            "Environment": {"Variables": {"A": "1"}}
        }"#;
        let def: FunctionDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.function_name.as_str(), "hello");
        assert_eq!(def.memory_size, Some(128));
        assert!(def.extra.contains_key("Environment"));
    }

    #[test]
    fn test_definition_requires_function_name() {
        let err = serde_json::from_str::<FunctionDefinition>(r#"{"Runtime": "x"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<FunctionDefinition>(r#"{"FunctionName": ""}"#);
        assert!(err.is_err());
    }
}
