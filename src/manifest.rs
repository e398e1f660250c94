//! Package manifest metadata.
//!
//! The package manifest (`package.json`) is the metadata record the
//! descriptor takes its defaults from: the `browser` field supplies the
//! destination path and the package name supplies the exposed global name.
//! Only the fields the pipeline cares about are read; everything else in
//! the file is ignored.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Default manifest filename.
pub const PACKAGE_MANIFEST_FILENAME: &str = "package.json";

/// Error during manifest operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error
    #[error("Failed to parse package.json: {0}")]
    Json(#[from] serde_json::Error),
}

/// The subset of package.json the pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Package version
    #[serde(default)]
    pub version: String,
    /// Browser bundle output path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<PathBuf>,
    /// ES module output path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<PathBuf>,
    /// CommonJS output path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<PathBuf>,
}

impl PackageManifest {
    /// Load a manifest from a file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist. A missing manifest is
    /// not an error here; a target that ends up without a destination is
    /// reported by descriptor validation instead.
    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let manifest: PackageManifest = serde_json::from_reader(reader)?;
        Ok(Some(manifest))
    }

    /// Load a manifest from the default location in a project root.
    pub fn load_from_dir(root: &Path) -> Result<Option<Self>, ManifestError> {
        Self::load(&root.join(PACKAGE_MANIFEST_FILENAME))
    }

    /// The output path the manifest supplies, in `browser`, `module`,
    /// `main` precedence order.
    pub fn output_path(&self) -> Option<&Path> {
        self.browser
            .as_deref()
            .or(self.module.as_deref())
            .or(self.main.as_deref())
    }

    /// Derive a global identifier from the package name.
    ///
    /// Strips a leading scope (`@scope/name` becomes `name`), replaces
    /// characters that are not valid in an identifier with underscores, and
    /// prefixes an underscore when the name starts with a digit. Returns
    /// `None` for an empty name.
    pub fn global_name(&self) -> Option<String> {
        let bare = match self.name.rsplit_once('/') {
            Some((scope, rest)) if scope.starts_with('@') => rest,
            _ => self.name.as_str(),
        };
        if bare.is_empty() {
            return None;
        }

        let mut global: String = bare
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
            .collect();
        if global.starts_with(|c: char| c.is_ascii_digit()) {
            global.insert(0, '_');
        }
        Some(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        File::create(&path)
            .unwrap()
            .write_all(
                br#"{
  "name": "trp",
  "version": "1.0.0",
  "browser": "dist/trp.js",
  "main": "dist/trp.cjs",
  "scripts": { "build": "ignored" }
}"#,
            )
            .unwrap();

        let manifest = PackageManifest::load(&path).unwrap().expect("manifest");
        assert_eq!(manifest.name, "trp");
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(manifest.browser, Some(PathBuf::from("dist/trp.js")));
        assert_eq!(manifest.main, Some(PathBuf::from("dist/trp.cjs")));
        assert_eq!(manifest.module, None);
    }

    #[test]
    fn test_load_missing_manifest_is_none() {
        let temp = TempDir::new().unwrap();
        let result = PackageManifest::load_from_dir(temp.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_manifest_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        File::create(&path).unwrap().write_all(b"not json").unwrap();

        let result = PackageManifest::load(&path);
        assert!(matches!(result, Err(ManifestError::Json(_))));
    }

    #[test]
    fn test_output_path_precedence() {
        let manifest = PackageManifest {
            browser: Some(PathBuf::from("dist/b.js")),
            module: Some(PathBuf::from("dist/m.js")),
            main: Some(PathBuf::from("dist/c.js")),
            ..Default::default()
        };
        assert_eq!(manifest.output_path(), Some(Path::new("dist/b.js")));

        let manifest = PackageManifest {
            module: Some(PathBuf::from("dist/m.js")),
            main: Some(PathBuf::from("dist/c.js")),
            ..Default::default()
        };
        assert_eq!(manifest.output_path(), Some(Path::new("dist/m.js")));

        let manifest = PackageManifest::default();
        assert_eq!(manifest.output_path(), None);
    }

    #[test]
    fn test_global_name_plain() {
        let manifest = PackageManifest { name: "trp".to_string(), ..Default::default() };
        assert_eq!(manifest.global_name(), Some("trp".to_string()));
    }

    #[test]
    fn test_global_name_scoped() {
        let manifest =
            PackageManifest { name: "@acme/render-kit".to_string(), ..Default::default() };
        assert_eq!(manifest.global_name(), Some("render_kit".to_string()));
    }

    #[test]
    fn test_global_name_leading_digit() {
        let manifest = PackageManifest { name: "3d-view".to_string(), ..Default::default() };
        assert_eq!(manifest.global_name(), Some("_3d_view".to_string()));
    }

    #[test]
    fn test_global_name_empty() {
        let manifest = PackageManifest::default();
        assert_eq!(manifest.global_name(), None);
    }
}
