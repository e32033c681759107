//! Gateway configuration

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::buffer::DEFAULT_CAPACITY;
use crate::error::{RestconfError, Result};
use crate::restconf_types::MediaType;

/// Settings shared by every request the gateway translates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// First path segment of every RESTCONF URI
    pub api_root: String,
    /// Segment naming the datastore resource under the API root
    pub data_resource: String,
    /// Segment naming the operations resource under the API root
    pub operations_resource: String,
    /// Initial capacity of the buffers used per translation
    pub buffer_capacity: usize,
    /// Encoding used when the client does not ask for one ("xml" or "json")
    pub default_encoding: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_root: "restconf".into(),
            data_resource: "data".into(),
            operations_resource: "operations".into(),
            buffer_capacity: DEFAULT_CAPACITY,
            default_encoding: "json".into(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.default_media_type()?;
        if config.api_root.is_empty() || config.api_root.contains('/') {
            return Err(RestconfError::MalformedPath(format!(
                "invalid api-root: {:?}",
                config.api_root
            )));
        }
        Ok(config)
    }

    /// The configured default encoding
    pub fn default_media_type(&self) -> Result<MediaType> {
        MediaType::from_name(&self.default_encoding)
            .ok_or_else(|| RestconfError::UnsupportedMediaType(self.default_encoding.clone()))
    }

    /// Number of fixed segments (API root and resource) before the api-path
    pub fn path_offset(&self) -> usize {
        2
    }
}

impl std::str::FromStr for GatewayConfig {
    type Err = RestconfError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}
