//! Build target descriptors.
//!
//! A target is one named, independently producible build output. The
//! pipeline spec is the ordered collection of targets a build consumes.

use crate::config::{BundleConfig, TargetConfig};
use crate::descriptor::{OutputSpec, StageSpec};
use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One build target: entry module, transform stages, and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Target name (config table key)
    pub name: String,
    /// Entry module path, relative to the project root
    pub entry: PathBuf,
    /// Output specification
    pub output: OutputSpec,
    /// Transform stages, in execution order
    pub stages: Vec<StageSpec>,
}

impl TargetDescriptor {
    /// Check if this target matches a filter string.
    ///
    /// Supports patterns like:
    /// - Exact match: "browser"
    /// - Any target: "*"
    /// - Format match: "iife"
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter == "*" || self.name == filter || self.output.format.to_string() == filter
    }
}

/// The full pipeline: an ordered sequence of target descriptors.
///
/// Constructed once from static declarations, never mutated afterwards,
/// and consumed in a single pass by the build runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    targets: Vec<TargetDescriptor>,
}

impl PipelineSpec {
    /// Create an empty pipeline spec.
    pub fn new() -> Self {
        Self { targets: vec![] }
    }

    /// Construct the pipeline spec from the configuration and the optional
    /// package manifest.
    ///
    /// This is pure: for a fixed config and manifest the result is
    /// structurally identical on every invocation. Targets appear in config
    /// name order. Defaults flow in here:
    /// - entry falls back to `project.entry`
    /// - destination falls back to the manifest output path (`browser`,
    ///   then `module`, then `main`); a target left without one gets an
    ///   empty destination for the runner's validation to reject
    /// - the global name falls back to the package name (then the project
    ///   name) for single-file-global outputs
    /// - sourcemap falls back to `defaults.sourcemap`
    /// - an empty stage list falls back to resolve (with the default
    ///   extension list) followed by compile
    pub fn from_config(config: &BundleConfig, manifest: Option<&PackageManifest>) -> Self {
        let targets = config
            .targets
            .iter()
            .map(|(name, target)| build_target(name, target, config, manifest))
            .collect();
        Self { targets }
    }

    /// Get all targets in declaration order.
    pub fn targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    /// Add a target to the spec.
    pub fn add_target(&mut self, target: TargetDescriptor) {
        self.targets.push(target);
    }

    /// Get the number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if the spec has no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Filter targets to only those matching the given patterns.
    pub fn filter(mut self, patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return self;
        }

        self.targets.retain(|t| patterns.iter().any(|p| t.matches_filter(p)));
        self
    }
}

fn build_target(
    name: &str,
    target: &TargetConfig,
    config: &BundleConfig,
    manifest: Option<&PackageManifest>,
) -> TargetDescriptor {
    let entry = target.entry.clone().unwrap_or_else(|| config.project.entry.clone());

    let file = target
        .dest
        .clone()
        .or_else(|| manifest.and_then(|m| m.output_path().map(PathBuf::from)))
        .unwrap_or_default();

    let global = if target.format.is_single_file_global() {
        target
            .global
            .clone()
            .or_else(|| manifest.and_then(PackageManifest::global_name))
            .or_else(|| config.project.name.clone())
    } else {
        target.global.clone()
    };

    let stages = if target.stages.is_empty() {
        vec![
            StageSpec::resolve()
                .with_option("extensions", serde_json::json!(config.defaults.extensions)),
            StageSpec::compile(),
        ]
    } else {
        target.stages.clone()
    };

    TargetDescriptor {
        name: name.to_string(),
        entry,
        output: OutputSpec {
            global,
            file,
            format: target.format,
            sourcemap: target.sourcemap.unwrap_or(config.defaults.sourcemap),
            post: target.post.clone(),
        },
        stages,
    }
}
