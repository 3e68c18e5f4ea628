//! Cinematic catalog - authored scene scripts for scripted sequences.
//!
//! A cinematic is an ordered list of typed scenes. The sequencer interprets
//! the list; what each scene kind looks and sounds like is the rendering
//! layer's business.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::CatalogError;
use crate::flags::FlagSetting;
use crate::ids::CinematicId;
use crate::state::DecisionKind;

/// Authored scene types. Each maps to a distinct presentation routine in the
/// rendering layer; the sequencer only cares about order, duration, and
/// decision gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    NewsBroadcast,
    Footage,
    Interview,
    LabScene,
    Closeup,
    Scene,
    Montage,
    BriefingRoom,
    HologramPresentation,
    CharacterFocus,
    Epilogue,
}

/// One selectable choice at a decision point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionChoiceDef {
    pub id: String,
    pub label: String,
    /// Behavioral tag recorded with the decision.
    pub kind: DecisionKind,
    /// Flags applied when this choice is selected.
    #[serde(default)]
    pub set_flags: Vec<FlagSetting>,
}

impl DecisionChoiceDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: DecisionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            set_flags: Vec::new(),
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>, value: impl Into<crate::FlagValue>) -> Self {
        self.set_flags.push(FlagSetting::new(flag, value));
        self
    }
}

/// A decision gate: playback suspends on this scene until a choice resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPointDef {
    /// Decision key recorded into the story state as `decision_<key>`.
    pub key: String,
    pub prompt: String,
    pub choices: Vec<DecisionChoiceDef>,
}

impl DecisionPointDef {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choice(mut self, choice: DecisionChoiceDef) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn choice(&self, id: &str) -> Option<&DecisionChoiceDef> {
        self.choices.iter().find(|choice| choice.id == id)
    }
}

/// One typed step in a cinematic's scene list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    pub kind: SceneKind,
    /// Seconds of playback before auto-advancing (ignored while a decision
    /// gate is open).
    pub duration: f64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub audio_track: Option<String>,
    #[serde(default)]
    pub decision_point: Option<DecisionPointDef>,
}

impl SceneDef {
    pub fn new(kind: SceneKind, duration: f64) -> Self {
        Self {
            kind,
            duration,
            text: None,
            background: None,
            audio_track: None,
            decision_point: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_audio(mut self, track: impl Into<String>) -> Self {
        self.audio_track = Some(track.into());
        self
    }

    pub fn with_decision_point(mut self, decision_point: DecisionPointDef) -> Self {
        self.decision_point = Some(decision_point);
        self
    }
}

/// A catalog cinematic definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinematicDef {
    pub id: CinematicId,
    pub title: String,
    #[serde(default)]
    pub skippable: bool,
    pub scenes: Vec<SceneDef>,
}

impl CinematicDef {
    pub fn new(id: impl Into<CinematicId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            skippable: false,
            scenes: Vec::new(),
        }
    }

    pub fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }

    pub fn with_scene(mut self, scene: SceneDef) -> Self {
        self.scenes.push(scene);
        self
    }

    pub fn scene(&self, index: usize) -> Option<&SceneDef> {
        self.scenes.get(index)
    }
}

#[derive(Deserialize)]
struct CinematicFile {
    cinematics: Vec<CinematicDef>,
}

/// Keyed cinematic table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CinematicCatalog {
    cinematics: HashMap<CinematicId, CinematicDef>,
}

impl CinematicCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs(defs: impl IntoIterator<Item = CinematicDef>) -> Result<Self, CatalogError> {
        let mut cinematics = HashMap::new();
        for def in defs {
            let id = def.id.clone();
            if cinematics.insert(id.clone(), def).is_some() {
                return Err(CatalogError::Duplicate {
                    kind: "cinematic",
                    id: id.to_string(),
                });
            }
        }
        Ok(Self { cinematics })
    }

    /// Load a catalog from an authored TOML document with a `[[cinematics]]` array.
    pub fn from_toml(source: &str) -> Result<Self, CatalogError> {
        let file: CinematicFile = toml::from_str(source)?;
        Self::from_defs(file.cinematics)
    }

    pub fn get(&self, id: &CinematicId) -> Option<&CinematicDef> {
        self.cinematics.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CinematicDef> {
        self.cinematics.values()
    }

    pub fn len(&self) -> usize {
        self.cinematics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cinematics.is_empty()
    }
}
