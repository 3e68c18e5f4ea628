//! # Narrative Engine
//!
//! The progression core of Quantum Salvation. This crate drives the story
//! clock over the `story_rules` state, evaluates triggers and milestones,
//! tracks mission lifecycles, and sequences cinematics.
//!
//! ## Core Components
//!
//! - **engine**: the story clock, trigger evaluator, and ending resolver
//! - **tracker**: mission/objective lifecycle layered on engine events
//! - **sequencer**: the pausable scene-script interpreter
//! - **session**: wires the three together with same-tick event dispatch
//!
//! ## Design Philosophy
//!
//! - **Single writer**: only the engine's mutators touch the story state;
//!   tracker and sequencer route every change through engine methods
//! - **Events after commits**: listeners only ever observe clamped,
//!   committed values
//! - **No exceptions for control flow**: failed operations log and return
//!   `false`; nothing panics across component boundaries

pub mod engine;
pub mod events;
pub mod save;
pub mod sequencer;
pub mod session;
pub mod tracker;

pub use engine::*;
pub use events::*;
pub use save::*;
pub use sequencer::*;
pub use session::*;
pub use tracker::*;
