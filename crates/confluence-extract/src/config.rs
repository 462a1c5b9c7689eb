//! Extraction configuration

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::postprocess::{default_directives, Directive};
use crate::Result;

/// Primitive types whose read-only members count as constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstantType {
    Boolean,
    Number,
    String,
}

impl ConstantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstantType::Boolean => "boolean",
            ConstantType::Number => "number",
            ConstantType::String => "string",
        }
    }
}

/// Options recognized by one extraction pass
///
/// Field names serialize in camelCase, e.g. `retainConstantMembers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionConfig {
    /// Name functions after the last segment of graph paths reaching them
    pub function_names_from_graph_paths: bool,
    /// Name prototypes after their `constructor`; when present, the other
    /// class-name heuristics do not run
    pub class_names_from_constructor_property: bool,
    /// Name prototypes after graph paths shaped `...<Name>.prototype`
    pub class_names_from_graph_paths: bool,
    /// Name prototypes after `[object <Name>]` style `toString` tags
    pub class_names_from_to_string: bool,
    /// Primitive types eligible for constant filtering
    pub constant_types: BTreeSet<ConstantType>,
    /// Keep read-only members of `constant_types`
    pub retain_constant_members: bool,
    /// Interfaces visible to post-processing but dropped from the output
    pub blacklist_interfaces: Vec<String>,
    /// Corrective directives, applied copy -> remove -> add
    pub post_processors: Vec<Directive>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            function_names_from_graph_paths: true,
            class_names_from_constructor_property: true,
            class_names_from_graph_paths: true,
            class_names_from_to_string: true,
            constant_types: [ConstantType::Boolean, ConstantType::Number, ConstantType::String]
                .into_iter()
                .collect(),
            retain_constant_members: false,
            blacklist_interfaces: vec![
                // Known-buggy interface in some Firefox versions
                // (https://bugzilla.mozilla.org/show_bug.cgi?id=1290786#c6)
                "CSS2Properties".to_string(),
                // Members of the global instance are copied onto "Window"
                "window".to_string(),
            ],
            post_processors: default_directives(),
        }
    }
}

impl ExtractionConfig {
    /// Parse a configuration; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// A configuration with no post-processing and no blacklist
    pub fn raw() -> Self {
        Self {
            blacklist_interfaces: Vec::new(),
            post_processors: Vec::new(),
            ..Self::default()
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether a value of primitive type `type_name` may be a constant
    pub fn is_constant_type(&self, type_name: &str) -> bool {
        self.constant_types.iter().any(|t| t.as_str() == type_name)
    }
}
