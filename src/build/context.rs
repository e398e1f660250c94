//! Build context containing configuration and state for a build.

use crate::config::BundleConfig;
use crate::descriptor::PipelineSpec;
use crate::manifest::PackageManifest;
use std::path::{Path, PathBuf};

/// Build context containing everything needed to construct and consume a
/// pipeline descriptor: the configuration, the optional package manifest,
/// and the project root paths resolve against.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: BundleConfig,
    /// The package manifest, when one was found
    manifest: Option<PackageManifest>,
    /// Project root directory (where bundle.toml is located)
    project_root: PathBuf,
    /// Whether to run in verbose mode
    verbose: bool,
    /// Optional filter to build specific targets only
    target_filter: Option<Vec<String>>,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: BundleConfig, project_root: PathBuf) -> Self {
        Self {
            config,
            manifest: None,
            project_root,
            verbose: false,
            target_filter: None,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Get the package manifest, if one was loaded.
    pub fn manifest(&self) -> Option<&PackageManifest> {
        self.manifest.as_ref()
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Attach a package manifest.
    pub fn with_manifest(mut self, manifest: Option<PackageManifest>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set target filter to build only specific targets.
    pub fn with_filter(mut self, targets: Vec<String>) -> Self {
        self.target_filter = Some(targets);
        self
    }

    /// Get the target filter.
    pub fn target_filter(&self) -> Option<&[String]> {
        self.target_filter.as_deref()
    }

    /// Construct the pipeline spec for this context, with the target
    /// filter applied.
    pub fn pipeline(&self) -> PipelineSpec {
        let spec = PipelineSpec::from_config(&self.config, self.manifest.as_ref());
        match &self.target_filter {
            Some(patterns) => spec.filter(patterns),
            None => spec,
        }
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Get the default extension list from config.
    pub fn default_extensions(&self) -> &[String] {
        &self.config.defaults.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    fn test_manifest() -> PackageManifest {
        PackageManifest {
            name: "app".to_string(),
            browser: Some(PathBuf::from("dist/app.js")),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_context_new() {
        let root = PathBuf::from("/project");
        let ctx = BuildContext::new(default_config(), root.clone());

        assert_eq!(ctx.project_root(), &root);
        assert!(!ctx.is_verbose());
        assert!(ctx.manifest().is_none());
        assert!(ctx.target_filter().is_none());
    }

    #[test]
    fn test_build_context_with_verbose() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"))
            .with_verbose(true);
        assert!(ctx.is_verbose());
    }

    #[test]
    fn test_build_context_with_filter() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"))
            .with_filter(vec!["browser".to_string()]);
        assert_eq!(ctx.target_filter(), Some(&["browser".to_string()][..]));
    }

    #[test]
    fn test_build_context_resolve_path() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"));

        assert_eq!(
            ctx.resolve_path(Path::new("dist/app.js")),
            PathBuf::from("/project/dist/app.js")
        );
        assert_eq!(ctx.resolve_path(Path::new("/other/path")), PathBuf::from("/other/path"));
    }

    #[test]
    fn test_build_context_pipeline_uses_manifest() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"))
            .with_manifest(Some(test_manifest()));

        let spec = ctx.pipeline();
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.targets()[0].output.file, PathBuf::from("dist/app.js"));
    }

    #[test]
    fn test_build_context_pipeline_applies_filter() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"))
            .with_manifest(Some(test_manifest()))
            .with_filter(vec!["nonexistent".to_string()]);

        assert!(ctx.pipeline().is_empty());
    }

    #[test]
    fn test_build_context_default_extensions() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"));
        assert_eq!(ctx.default_extensions(), [".js", ".json", ".ts"]);
    }
}
