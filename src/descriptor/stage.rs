//! Transform stage definitions.
//!
//! A stage is one discrete transform applied to a module or artifact during
//! a build: module resolution, type-stripped compilation, minification, or
//! an externally registered kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Kind of transform stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Entry module resolution
    Resolve,
    /// Type-stripped compilation
    Compile,
    /// Bundle minification
    Minify,
    /// Externally provided stage kind
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Resolve => write!(f, "resolve"),
            StageKind::Compile => write!(f, "compile"),
            StageKind::Minify => write!(f, "minify"),
            StageKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One transform stage with its options.
///
/// Options are an open mapping so that stage implementations can declare
/// whatever knobs they need without the descriptor knowing about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// What kind of stage this is
    pub kind: StageKind,
    /// Stage-specific options
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
}

impl StageSpec {
    /// Create a stage of the given kind with no options.
    pub fn new(kind: StageKind) -> Self {
        Self { kind, options: BTreeMap::new() }
    }

    /// Create a resolve stage.
    pub fn resolve() -> Self {
        Self::new(StageKind::Resolve)
    }

    /// Create a compile stage.
    pub fn compile() -> Self {
        Self::new(StageKind::Compile)
    }

    /// Create a minify stage.
    pub fn minify() -> Self {
        Self::new(StageKind::Minify)
    }

    /// Create a stage with an externally registered kind.
    pub fn other(name: impl Into<String>) -> Self {
        Self::new(StageKind::Other(name.into()))
    }

    /// Add an option to this stage.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up a boolean option.
    pub fn bool_option(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(Value::as_bool)
    }

    /// Look up a string option.
    pub fn str_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Look up a list-of-strings option. Non-string elements are skipped.
    pub fn str_list_option(&self, key: &str) -> Option<Vec<String>> {
        let list = self.options.get(key)?.as_array()?;
        Some(list.iter().filter_map(|v| v.as_str().map(String::from)).collect())
    }
}
