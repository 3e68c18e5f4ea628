//! Content catalogs - static, read-only authored data loaded at startup.
//!
//! Catalogs are keyed record tables (missions, cinematics, endings). The
//! engine treats them as immutable configuration: editing content requires
//! no engine code changes, and each catalog can be authored as a TOML
//! document and loaded with the `from_toml` constructors.

mod cinematic;
mod ending;
mod mission;

pub use cinematic::*;
pub use ending::*;
pub use mission::*;

use thiserror::Error;

/// Errors raised while loading or validating authored content.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate {kind} id `{id}`")]
    Duplicate { kind: &'static str, id: String },
}
