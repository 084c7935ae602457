//! Classense - On-device behavioral feature extraction engine
//!
//! Classense turns per-subject sequences of skeletal keypoint frames into
//! engagement signals through a deterministic pipeline: parse → validate →
//! movement analysis + attention analysis → baseline comparison → report
//! encoding.
//!
//! ## Modules
//!
//! - **Movement Analysis**: displacement statistics, intensity score,
//!   fidgeting and position-change detection
//! - **Attention Analysis**: on-task classification, focus/distraction
//!   segmentation, pattern labeling

pub mod adapter;
pub mod attention;
pub mod baseline;
pub mod config;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod movement;
pub mod pipeline;
pub mod segmentation;
pub mod types;

mod stats;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

#[cfg(test)]
mod testutil;

pub use attention::AttentionAnalyzer;
pub use config::EngineConfig;
pub use error::EngineError;
pub use movement::MovementAnalyzer;
pub use pipeline::{analyze_to_report, EngagementProcessor};

// Data model exports
pub use types::{
    AttentionResult, HeadOrientation, Keypoint, MovementResult, PoseFrame, PoseSequence, TimedRun,
};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "classense";
