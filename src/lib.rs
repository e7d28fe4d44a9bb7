//! proctor-risk - Risk scoring for remotely proctored exam attempts
//!
//! Turns the behavioral event log captured during one exam attempt into a
//! bounded risk score, a severity tier and human-readable reasons through a
//! deterministic pipeline: normalization → focus / paste analysis → pattern
//! detection → scoring.
//!
//! The scoring core is a pure, total function: it performs no I/O, keeps no
//! state between calls and always returns an assessment.

pub mod adapter;
pub mod config;
pub mod encoder;
pub mod error;
pub mod focus;
pub mod normalizer;
pub mod paste;
pub mod patterns;
pub mod pipeline;
pub mod scorer;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::{AttemptRecord, EventLogAdapter};
pub use config::AnalyzerConfig;
pub use encoder::{AssessmentReport, ReportEncoder};
pub use error::ScoreError;
pub use pipeline::{assess, assess_json, assess_opt, RiskEngine};
pub use types::{EventType, ProctorEvent, RiskAssessment, RiskLevel, RiskMetrics};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "proctor-risk";
