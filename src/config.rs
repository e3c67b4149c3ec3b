//! Connector configuration
//!
//! User-supplied configuration for the Tracker source, plus the
//! specification types rendered by the `spec` command for UI/validation.

use crate::error::{Error, Result};
use crate::types::{OptionStringExt, PropertyType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Production API root. Tests point `base_url` at a local mock server.
pub const DEFAULT_BASE_URL: &str = "https://www.pivotaltracker.com/services/v5";

// ============================================================================
// Source Config
// ============================================================================

/// User configuration for the Tracker source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API token sent in the `X-TrackerToken` header
    pub api_token: String,

    /// API base URL (override for testing)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl SourceConfig {
    /// Create a config with the default base URL
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: default_base_url(),
        }
    }

    /// Parse a config from a JSON value
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        Self::from_value(&value)
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<()> {
        if self.api_token.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("api_token"));
        }
        if self.base_url.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("base_url"));
        }
        Url::parse(&self.base_url)?;
        Ok(())
    }
}

// ============================================================================
// Connection Specification
// ============================================================================

/// The fields a host asks the user for when setting up this source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    #[serde(default)]
    pub properties: HashMap<String, PropertyConfig>,
}

/// One field of the connection specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyConfig {
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    /// Label shown in setup UIs
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Masked in UIs and never logged
    #[serde(default)]
    pub secret: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl PropertyConfig {
    fn to_schema(&self) -> serde_json::Value {
        let mut schema = serde_json::Map::new();
        schema.insert(
            "type".to_string(),
            serde_json::to_value(&self.property_type).unwrap_or_default(),
        );
        if let Some(title) = &self.title {
            schema.insert("title".to_string(), serde_json::Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            schema.insert(
                "description".to_string(),
                serde_json::Value::String(description.clone()),
            );
        }
        if self.secret {
            schema.insert("secret".to_string(), serde_json::Value::Bool(true));
        }
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        serde_json::Value::Object(schema)
    }
}

impl SpecConfig {
    /// Render as the JSON schema object the SPEC message carries
    ///
    /// Required field names are sorted so the output is stable.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required: Vec<String> = Vec::new();

        for (name, prop) in &self.properties {
            if prop.required {
                required.push(name.clone());
            }
            properties.insert(name.clone(), prop.to_schema());
        }
        required.sort();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Connection specification for the Tracker source
///
/// A single secret field, the API token. The `base_url` override is
/// a test hook and does not appear in the spec.
pub fn connection_spec() -> SpecConfig {
    let mut properties = HashMap::new();
    properties.insert(
        "api_token".to_string(),
        PropertyConfig {
            property_type: PropertyType::String,
            title: Some("API Token".to_string()),
            description: Some(
                "Pivotal Tracker API token, found in your profile settings".to_string(),
            ),
            secret: true,
            required: true,
            default: None,
        },
    );
    SpecConfig { properties }
}
