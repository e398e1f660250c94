//! Configuration loading and discovery for `bundle.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{BundleConfig, TargetConfig};
use crate::descriptor::{OutputFormat, StageSpec};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config filename.
pub const CONFIG_FILENAME: &str = "bundle.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bundle.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Override entry module
    pub entry: Option<PathBuf>,
    /// Override sourcemap emission for all targets
    pub sourcemap: Option<bool>,
    /// Override module format for all targets
    pub format: Option<OutputFormat>,
}

/// Find bundle.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a bundle.toml file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    find_config_from(cwd)
}

/// Find bundle.toml by walking up from a specific directory.
///
/// This is the internal implementation that allows specifying the start
/// directory, useful for testing.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a bundle.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// `find_config()` to locate one. If no config file is found, returns the
/// default configuration, which declares the single browser target the
/// original pipeline shipped with.
pub fn load_config(path: Option<&Path>) -> Result<BundleConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<BundleConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: BundleConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(
            errors.into_iter().map(|e| e.to_string()).collect(),
        ));
    }

    Ok(config)
}

/// Create the default configuration used when no bundle.toml is found.
///
/// Declares a single `browser` target: resolve with the default extension
/// list, compile, then a minify post stage that keeps class and function
/// names. Destination and global name are left unset so they fall through
/// to the package manifest.
pub fn default_config() -> BundleConfig {
    let mut config = BundleConfig::default();

    let browser = TargetConfig {
        stages: vec![
            StageSpec::resolve().with_option(
                "extensions",
                serde_json::json!(config.defaults.extensions),
            ),
            StageSpec::compile(),
        ],
        post: vec![StageSpec::minify()
            .with_option("keep_classnames", true)
            .with_option("keep_fnames", true)],
        ..Default::default()
    };

    config.targets.insert("browser".to_string(), browser);
    config
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut BundleConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
        // Rebase declared destinations into the new output directory by
        // file name. Manifest-supplied destinations are used verbatim.
        for target in config.targets.values_mut() {
            if let Some(name) = target.dest.as_ref().and_then(|d| d.file_name()) {
                target.dest = Some(out.join(name));
            }
        }
    }

    if let Some(ref entry) = overrides.entry {
        config.project.entry = entry.clone();
        for target in config.targets.values_mut() {
            target.entry = None;
        }
    }

    if let Some(sourcemap) = overrides.sourcemap {
        config.defaults.sourcemap = sourcemap;
        for target in config.targets.values_mut() {
            target.sourcemap = None;
        }
    }

    if let Some(format) = overrides.format {
        for target in config.targets.values_mut() {
            target.format = format;
        }
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
