//! Output specifications.
//!
//! An output describes the single artifact a target produces: where it is
//! written, what module format it uses, and which post stages run on the
//! generated bundle.

use crate::descriptor::StageSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Module format of a produced bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Single-file bundle exposed under a global name
    #[default]
    Iife,
    /// ES module
    Esm,
    /// CommonJS module
    Cjs,
}

impl OutputFormat {
    /// Whether this format produces a single file exposing a global name.
    pub fn is_single_file_global(&self) -> bool {
        matches!(self, OutputFormat::Iife)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Iife => write!(f, "iife"),
            OutputFormat::Esm => write!(f, "esm"),
            OutputFormat::Cjs => write!(f, "cjs"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iife" => Ok(OutputFormat::Iife),
            "esm" => Ok(OutputFormat::Esm),
            "cjs" => Ok(OutputFormat::Cjs),
            other => Err(format!("unknown format '{}' (expected iife, esm, or cjs)", other)),
        }
    }
}

/// Output specification for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Global name the bundle is exposed under (iife outputs)
    pub global: Option<String>,
    /// Destination path, relative to the project root
    pub file: PathBuf,
    /// Module format
    pub format: OutputFormat,
    /// Whether to emit a sourcemap next to the bundle
    pub sourcemap: bool,
    /// Post stages applied to the generated bundle, in order
    pub post: Vec<StageSpec>,
}

impl OutputSpec {
    /// Create an output spec with iife format, no global name, no
    /// sourcemap, and no post stages.
    pub fn new(file: PathBuf) -> Self {
        Self {
            global: None,
            file,
            format: OutputFormat::default(),
            sourcemap: false,
            post: vec![],
        }
    }

    /// Set the exposed global name.
    pub fn with_global(mut self, global: impl Into<String>) -> Self {
        self.global = Some(global.into());
        self
    }

    /// Set the module format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable sourcemap emission.
    pub fn with_sourcemap(mut self, sourcemap: bool) -> Self {
        self.sourcemap = sourcemap;
        self
    }

    /// Append a post stage.
    pub fn with_post(mut self, stage: StageSpec) -> Self {
        self.post.push(stage);
        self
    }
}
