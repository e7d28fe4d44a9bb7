//! Core types for proctor-risk
//!
//! This module defines the values that flow through an assessment: the raw
//! behavioral events reported by the exam client, the metrics derived by each
//! analyzer, and the final risk assessment handed to reviewers.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

/// Behavioral event tag reported by the exam client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Exam window lost focus (blur)
    FocusLost,
    /// Exam window regained focus
    FocusGained,
    /// Clipboard paste into the editor
    Paste,
    /// Single text insertion above the producer's size threshold
    LargeInsert,
    /// Any other application-defined tag; ignored by the analyzers
    #[serde(untagged)]
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::FocusLost => "FOCUS_LOST",
            EventType::FocusGained => "FOCUS_GAINED",
            EventType::Paste => "PASTE",
            EventType::LargeInsert => "LARGE_INSERT",
            EventType::Other(tag) => tag.as_str(),
        }
    }
}

/// One observed behavioral occurrence during an attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctorEvent {
    /// Event tag
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Open-ended producer metadata (`len`, `newCode` for large inserts).
    ///
    /// Kept as a raw value; anything other than an object reads as empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ProctorEvent {
    pub fn new(event_type: EventType, timestamp: i64) -> Self {
        Self {
            event_type,
            timestamp,
            meta: None,
        }
    }

    /// Build a `LARGE_INSERT` event carrying `len` and `newCode` metadata
    pub fn large_insert(timestamp: i64, len: i64, new_code: bool) -> Self {
        Self {
            event_type: EventType::LargeInsert,
            timestamp,
            meta: Some(json!({ "len": len, "newCode": new_code })),
        }
    }

    /// Look up a metadata field; `None` unless `meta` is an object
    pub fn meta_field(&self, key: &str) -> Option<&Value> {
        self.meta
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|m| m.get(key))
    }

    /// Insertion length from `meta.len`, 0 when absent or non-numeric.
    ///
    /// The number is used as reported: fractional and negative values are
    /// passed through untouched.
    pub fn insert_len(&self) -> f64 {
        self.meta_field("len")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Whether `meta.newCode` is truthy
    pub fn is_new_code(&self) -> bool {
        self.meta_field("newCode").map(is_truthy).unwrap_or(false)
    }
}

/// JSON truthiness as understood by event producers
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Focus-loss timing metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusMetrics {
    /// Number of `FOCUS_LOST` events
    pub focus_lost_count: u32,
    /// Sum of all focus-loss intervals (ms)
    pub total_focus_lost_time_ms: i64,
    /// `total / count`, 0 when there were no losses
    pub avg_focus_lost_time_ms: f64,
    /// Longest single focus-loss interval (ms)
    pub longest_focus_lost_time_ms: i64,
    /// Resolved losses shorter than the rapid-switch threshold
    pub rapid_switch_count: u32,
}

/// Clipboard and large-insertion metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteMetrics {
    pub paste_count: u32,
    pub large_insert_count: u32,
    /// Sum of `meta.len` over large inserts
    #[serde(serialize_with = "serialize_len")]
    pub total_large_insert_chars: f64,
    /// Maximum `meta.len` over large inserts (never below 0)
    #[serde(serialize_with = "serialize_len")]
    pub biggest_insert_len: f64,
    /// Large inserts flagged as previously unseen code
    pub new_code_large_insert_count: u32,
}

/// Whole lengths serialize as JSON integers, fractional ones as floats
fn serialize_len<S: Serializer>(len: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // Beyond 2^53 an f64 no longer maps onto a unique integer
    if len.fract() == 0.0 && len.abs() < 9.0e15 {
        serializer.serialize_i64(*len as i64)
    } else {
        serializer.serialize_f64(*len)
    }
}

/// Temporal pattern metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMetrics {
    /// Number of paste events that start a burst window
    pub paste_burst_count: u32,
    /// Large inserts that followed a long focus loss
    pub large_insert_after_long_focus_lost: u32,
}

/// Flat view over every derived quantity, exposed for display and audit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    #[serde(flatten)]
    pub focus: FocusMetrics,
    #[serde(flatten)]
    pub paste: PasteMetrics,
    #[serde(flatten)]
    pub patterns: PatternMetrics,
    /// `totalFocusLostTimeMs` in whole minutes (rounded)
    pub total_focus_lost_min: i64,
    /// `longestFocusLostTimeMs` in whole minutes (rounded)
    pub longest_focus_lost_min: i64,
}

impl RiskMetrics {
    pub fn new(focus: FocusMetrics, paste: PasteMetrics, patterns: PatternMetrics) -> Self {
        let total_focus_lost_min = ms_to_min(focus.total_focus_lost_time_ms);
        let longest_focus_lost_min = ms_to_min(focus.longest_focus_lost_time_ms);
        Self {
            focus,
            paste,
            patterns,
            total_focus_lost_min,
            longest_focus_lost_min,
        }
    }
}

/// Convert milliseconds to whole minutes, rounding half away from zero
pub fn ms_to_min(ms: i64) -> i64 {
    (ms as f64 / 60_000.0).round() as i64
}

/// Severity tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Score at or above which an attempt is `MEDIUM`
    pub const MEDIUM_THRESHOLD: u32 = 25;
    /// Score at or above which an attempt is `HIGH`
    pub const HIGH_THRESHOLD: u32 = 60;

    pub fn from_score(score: u32) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

/// Quantitative risk assessment for one exam attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Bounded score in `[0, 100]`
    pub score: u32,
    pub level: RiskLevel,
    /// Human-readable justifications, in fixed evaluation order
    pub reasons: Vec<String>,
    pub metrics: RiskMetrics,
}
