//! Timing and judgment engine for a four-lane rhythm game.
//!
//! The crate covers the parts of the game with real invariants: the
//! audio-derived clock, latency calibration, note timeline management,
//! press/release judgment, the long-note hold state machine and the
//! score/combo ledger. Rendering, screens and score persistence are
//! collaborator concerns and consume this crate's outputs (judgment
//! events, the active-note list, round summaries).

pub mod audio;
pub mod chart;
pub mod config;
pub mod engine;
pub mod util;
