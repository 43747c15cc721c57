//! Test fixtures
//!
//! - Audio fixtures (programmatically generated, WAV via `hound`)
//! - Configuration fixtures

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

pub mod audio_fixtures;
pub mod config_fixtures;

pub use audio_fixtures::*;
pub use config_fixtures::*;
