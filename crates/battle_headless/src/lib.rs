//! # Battle Headless
//!
//! Runs battles without a client attached: asset loading, scripted
//! scenario runs, determinism verification and replay playback.
//!
//! The simulation itself lives in `battle_core`; this crate owns all
//! file IO and the command-line surface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assets;
pub mod runner;
