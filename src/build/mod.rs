//! Build runner for pipeline descriptors.
//!
//! The runner is the external consumer of a [`PipelineSpec`]: it validates
//! the descriptor, resolves entry modules, executes each target's stages in
//! declared order through registered stage executors, and writes the
//! resulting bundles.
//!
//! # Overview
//!
//! - **Validation**: reject descriptors with unresolvable entries,
//!   duplicate destinations, or stage kinds nothing can execute
//! - **Execution**: run transform stages, then post stages, then write the
//!   destination (and sourcemap sibling when one was produced)
//!
//! # Example
//!
//! ```ignore
//! use tspack::build::{BuildContext, BuildRunner};
//! use tspack::config::load_config;
//!
//! let config = load_config(None)?;
//! let context = BuildContext::new(config, project_root);
//! let result = BuildRunner::new(context).build()?;
//! println!("{}", result.summary());
//! ```
//!
//! [`PipelineSpec`]: crate::descriptor::PipelineSpec

pub mod context;
pub mod resolver;
pub mod result;
pub mod runner;
pub mod validate;

pub use context::*;
pub use resolver::*;
pub use result::*;
pub use runner::*;
pub use validate::*;
