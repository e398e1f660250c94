//! tspack - Declarative bundle pipeline descriptor and build runner
//!
//! This library provides functionality to:
//! - Load bundle configuration from `bundle.toml` and `package.json`
//! - Construct a deterministic pipeline descriptor of build targets
//! - Validate descriptors and run their stages through pluggable executors

pub mod build;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod manifest;
