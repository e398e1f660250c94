//! Configuration handling for `bundle.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
