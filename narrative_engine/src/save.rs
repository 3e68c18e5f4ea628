//! Save snapshots - versioned serialization of a playthrough.
//!
//! A snapshot captures the story state plus the triggered-events guard.
//! Condition watchers and bus subscriptions are process-local closures and
//! are not serialized; loading fails closed, leaving the engine untouched
//! on any validation error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use story_rules::StoryState;

/// Current snapshot schema version.
pub const SAVE_SCHEMA_VERSION: u32 = 1;

/// A complete save snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub schema_version: u32,
    pub run_id: Uuid,
    /// Story-clock seconds at the moment of saving.
    pub game_time: f64,
    pub state: StoryState,
    pub triggered_events: HashSet<String>,
}

/// Errors surfaced while encoding or decoding snapshots.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("malformed save payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("save payload has no `state` section")]
    MissingState,

    #[error("unsupported save schema version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Encode a snapshot as JSON.
pub fn to_json(save: &SaveGame) -> Result<String, SaveError> {
    Ok(serde_json::to_string(save)?)
}

/// Decode a snapshot from JSON.
///
/// Validates the payload shape before the typed parse: a payload without a
/// `state` section is rejected outright, and a version mismatch is reported
/// explicitly rather than as a field error.
pub fn from_json(json: &str) -> Result<SaveGame, SaveError> {
    let value: Value = serde_json::from_str(json)?;
    let Some(object) = value.as_object() else {
        return Err(SaveError::MissingState);
    };
    if !object.contains_key("state") {
        return Err(SaveError::MissingState);
    }
    if let Some(found) = object.get("schema_version").and_then(Value::as_u64) {
        let found = found as u32;
        if found != SAVE_SCHEMA_VERSION {
            return Err(SaveError::VersionMismatch {
                found,
                expected: SAVE_SCHEMA_VERSION,
            });
        }
    }
    Ok(serde_json::from_value(value)?)
}
