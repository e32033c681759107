//! Schema lookups used during translation
//!
//! The translator only needs two facts from the YANG schema engine: the
//! ordered key leaves of a list, and the XML namespace of a module. Both are
//! behind [`SchemaLookup`]. [`SchemaFile`] is a JSON-described implementation
//! for embedders without a live schema engine.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{RestconfError, Result};

/// Read-only schema capability consumed by the translator
pub trait SchemaLookup {
    /// Ordered key-leaf names of the list at `keypath` in `module`.
    ///
    /// `keypath` is a schema path with every segment's module prefix and
    /// all predicates removed, e.g. `/jukebox/library/artist`. `module` is
    /// the module of the top-level node, even when a later segment belongs
    /// to an augmenting module. Returns `None` when the node does not exist
    /// or is not a list.
    fn list_keys(&self, module: &str, keypath: &str) -> Option<Vec<String>>;

    /// Namespace URI of `module`
    fn namespace(&self, module: &str) -> Option<String>;
}

/// Schema facts for one YANG module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSchema {
    /// Module name, as used in api-path prefixes
    pub name: String,
    /// XML namespace URI
    pub namespace: String,
    /// Mapping from list schema path to its ordered key leaves
    pub lists: HashMap<String, Vec<String>>,
}

impl ModuleSchema {
    /// Create a module with no lists
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            lists: HashMap::new(),
        }
    }

    /// Add a list and its key leaves
    pub fn with_list(mut self, keypath: &str, keys: &[&str]) -> Self {
        self.lists.insert(
            keypath.to_owned(),
            keys.iter().map(|k| (*k).to_owned()).collect(),
        );
        self
    }
}

/// Collection of module schemas, usually loaded from a JSON file
#[derive(Debug, Clone, Default)]
pub struct SchemaFile {
    /// Modules by name
    pub modules: HashMap<String, ModuleSchema>,
}

/// Raw schema file structure for deserialization
#[derive(Debug, Deserialize)]
struct RawSchemaFile {
    #[serde(alias = "module")]
    modules: Vec<RawModule>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(rename = "module-name")]
    module_name: String,
    namespace: String,
    #[serde(default)]
    lists: HashMap<String, Vec<String>>,
}

impl SchemaFile {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, replacing any module with the same name
    pub fn with_module(mut self, module: ModuleSchema) -> Self {
        self.modules.insert(module.name.clone(), module);
        self
    }

    /// Parse a schema file from the given path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a schema file from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawSchemaFile = serde_json::from_str(content)?;

        let mut modules = HashMap::with_capacity(raw.modules.len());
        for module in raw.modules {
            if let Some(bad) = module.lists.keys().find(|p| !p.starts_with('/')) {
                return Err(RestconfError::MalformedPath(format!(
                    "list path must be absolute: {}",
                    bad
                )));
            }
            modules.insert(
                module.module_name.clone(),
                ModuleSchema {
                    name: module.module_name,
                    namespace: module.namespace,
                    lists: module.lists,
                },
            );
        }

        Ok(Self { modules })
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&ModuleSchema> {
        self.modules.get(name)
    }
}

impl SchemaLookup for SchemaFile {
    fn list_keys(&self, module: &str, keypath: &str) -> Option<Vec<String>> {
        self.modules.get(module)?.lists.get(keypath).cloned()
    }

    fn namespace(&self, module: &str) -> Option<String> {
        self.modules.get(module).map(|m| m.namespace.clone())
    }
}

impl std::str::FromStr for SchemaFile {
    type Err = RestconfError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}
