//! Configuration schema types for `bundle.toml`
//!
//! Defines the structure and validation rules for the static build
//! declarations the pipeline descriptor is constructed from.

use crate::descriptor::{OutputFormat, StageSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name, used as the fallback global name when no package
    /// manifest supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Default entry module
    #[serde(default = "default_entry")]
    pub entry: PathBuf,
    /// Output directory used by CLI overrides
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: None, entry: default_entry(), out: default_out() }
    }
}

fn default_entry() -> PathBuf {
    PathBuf::from("src/index.ts")
}

fn default_out() -> PathBuf {
    PathBuf::from("dist")
}

/// Default settings applied to all targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Emit sourcemaps unless a target says otherwise
    #[serde(default = "default_true")]
    pub sourcemap: bool,
    /// Extension list used when resolving entry modules
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { sourcemap: true, extensions: default_extensions() }
    }
}

fn default_true() -> bool {
    true
}

/// Extension probe order matching the original resolve configuration.
pub fn default_extensions() -> Vec<String> {
    vec![".js".to_string(), ".json".to_string(), ".ts".to_string()]
}

/// One target declaration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    /// Entry module (falls back to `project.entry`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,
    /// Destination path (falls back to the package manifest's output field)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,
    /// Exposed global name (falls back to the package name for iife outputs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
    /// Module format
    #[serde(default)]
    pub format: OutputFormat,
    /// Sourcemap emission (falls back to `defaults.sourcemap`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,
    /// Transform stages, in execution order
    #[serde(default)]
    pub stages: Vec<StageSpec>,
    /// Post stages applied to the generated bundle, in execution order
    #[serde(default)]
    pub post: Vec<StageSpec>,
}

/// Complete bundle.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BundleConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,
    /// Default settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Target declarations, keyed by target name.
    ///
    /// A `BTreeMap` keeps construction deterministic: the descriptor built
    /// from this config lists targets in name order on every invocation.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "targets.browser.dest")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bundle.toml: '{}' {}", self.field, self.message)
    }
}

impl BundleConfig {
    /// Validate the configuration and return any errors.
    ///
    /// Only structural checks live here. Cross-target checks that need the
    /// package manifest or the filesystem (duplicate destinations, entry
    /// resolution) belong to the build runner.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.entry.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "project.entry".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        if self.defaults.extensions.is_empty() {
            errors.push(ConfigValidationError {
                field: "defaults.extensions".to_string(),
                message: "must contain at least one extension".to_string(),
            });
        }
        for ext in &self.defaults.extensions {
            if !ext.starts_with('.') {
                errors.push(ConfigValidationError {
                    field: "defaults.extensions".to_string(),
                    message: format!("extension '{}' must start with '.'", ext),
                });
            }
        }

        for (name, target) in &self.targets {
            if name.is_empty() {
                errors.push(ConfigValidationError {
                    field: "targets".to_string(),
                    message: "target name must be non-empty".to_string(),
                });
            }

            if let Some(entry) = &target.entry {
                if entry.as_os_str().is_empty() {
                    errors.push(ConfigValidationError {
                        field: format!("targets.{}.entry", name),
                        message: "must be a non-empty path".to_string(),
                    });
                }
            }

            if let Some(dest) = &target.dest {
                if dest.as_os_str().is_empty() {
                    errors.push(ConfigValidationError {
                        field: format!("targets.{}.dest", name),
                        message: "must be a non-empty path".to_string(),
                    });
                }
            }

            if let Some(global) = &target.global {
                if global.is_empty() {
                    errors.push(ConfigValidationError {
                        field: format!("targets.{}.global", name),
                        message: "must be a non-empty string".to_string(),
                    });
                }
            }
        }

        errors
    }

    /// Check if validation passed.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::StageKind;

    #[test]
    fn test_empty_config_parse() {
        let config: BundleConfig = toml::from_str("").unwrap();
        assert_eq!(config.project.entry, PathBuf::from("src/index.ts"));
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert!(config.defaults.sourcemap);
        assert_eq!(config.defaults.extensions, vec![".js", ".json", ".ts"]);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "app"
entry = "src/main.ts"
out = "build"

[defaults]
sourcemap = false
extensions = [".ts", ".js"]

[targets.browser]
dest = "build/app.js"
global = "app"
format = "iife"
sourcemap = true

[[targets.browser.stages]]
kind = "resolve"
extensions = [".ts", ".js"]

[[targets.browser.stages]]
kind = "compile"
tsconfig = "tsconfig.browser.json"

[[targets.browser.post]]
kind = "minify"
keep_classnames = true
keep_fnames = true

[targets.node]
entry = "src/node.ts"
dest = "build/app.cjs"
format = "cjs"
"#;
        let config: BundleConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.project.name.as_deref(), Some("app"));
        assert_eq!(config.project.entry, PathBuf::from("src/main.ts"));
        assert!(!config.defaults.sourcemap);

        let browser = config.targets.get("browser").unwrap();
        assert_eq!(browser.dest, Some(PathBuf::from("build/app.js")));
        assert_eq!(browser.global.as_deref(), Some("app"));
        assert_eq!(browser.format, OutputFormat::Iife);
        assert_eq!(browser.sourcemap, Some(true));
        assert_eq!(browser.stages.len(), 2);
        assert_eq!(browser.stages[0].kind, StageKind::Resolve);
        assert_eq!(browser.stages[1].kind, StageKind::Compile);
        assert_eq!(browser.stages[1].str_option("tsconfig"), Some("tsconfig.browser.json"));
        assert_eq!(browser.post.len(), 1);
        assert_eq!(browser.post[0].kind, StageKind::Minify);
        assert_eq!(browser.post[0].bool_option("keep_classnames"), Some(true));

        let node = config.targets.get("node").unwrap();
        assert_eq!(node.entry, Some(PathBuf::from("src/node.ts")));
        assert_eq!(node.format, OutputFormat::Cjs);
        assert_eq!(node.sourcemap, None);
    }

    #[test]
    fn test_targets_iterate_in_name_order() {
        let toml = r#"
[targets.zeta]
dest = "dist/z.js"

[targets.alpha]
dest = "dist/a.js"
"#;
        let config: BundleConfig = toml::from_str(toml).unwrap();
        let names: Vec<_> = config.targets.keys().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_validation_empty_entry() {
        let mut config = BundleConfig::default();
        config.project.entry = PathBuf::new();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "project.entry"));
    }

    #[test]
    fn test_validation_empty_extensions() {
        let mut config = BundleConfig::default();
        config.defaults.extensions.clear();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "defaults.extensions"));
    }

    #[test]
    fn test_validation_extension_without_dot() {
        let mut config = BundleConfig::default();
        config.defaults.extensions = vec!["ts".to_string()];
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.message.contains("must start with '.'")));
    }

    #[test]
    fn test_validation_empty_target_fields() {
        let toml = r#"
[targets.bad]
dest = ""
global = ""
"#;
        let config: BundleConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "targets.bad.dest"));
        assert!(errors.iter().any(|e| e.field == "targets.bad.global"));
    }

    #[test]
    fn test_valid_config_passes() {
        let config = BundleConfig::default();
        assert!(config.is_valid());
    }
}
