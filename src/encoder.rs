//! Assessment report encoder
//!
//! Wraps a [`RiskAssessment`] into a report envelope for the presentation and
//! audit layers. The assessment itself stays a pure function of the events;
//! only the envelope carries producer identity and computation time.

use crate::adapter::summarize_event_types;
use crate::error::ScoreError;
use crate::types::{ProctorEvent, RiskAssessment};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report envelope around one assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
    /// Earliest event time in the log (RFC 3339)
    pub observed_from_utc: Option<String>,
    /// Latest event time in the log (RFC 3339)
    pub observed_to_utc: Option<String>,
    pub total_events: usize,
    /// Event count per type tag
    pub event_summary: BTreeMap<String, u32>,
    pub assessment: RiskAssessment,
}

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the report envelope for an assessment of `events`
    pub fn encode(
        &self,
        attempt_id: Option<String>,
        events: &[ProctorEvent],
        assessment: RiskAssessment,
    ) -> AssessmentReport {
        let first = events.iter().map(|e| e.timestamp).min();
        let last = events.iter().map(|e| e.timestamp).max();

        AssessmentReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            attempt_id,
            observed_from_utc: first.and_then(millis_to_rfc3339),
            observed_to_utc: last.and_then(millis_to_rfc3339),
            total_events: events.len(),
            event_summary: summarize_event_types(events),
            assessment,
        }
    }

    /// Encode to a compact JSON string
    pub fn to_json(&self, report: &AssessmentReport) -> Result<String, ScoreError> {
        serde_json::to_string(report).map_err(|e| ScoreError::EncodingError(e.to_string()))
    }

    /// Encode to a pretty-printed JSON string
    pub fn to_json_pretty(&self, report: &AssessmentReport) -> Result<String, ScoreError> {
        serde_json::to_string_pretty(report)
            .map_err(|e| ScoreError::EncodingError(e.to_string()))
    }
}

/// Epoch milliseconds to RFC 3339, `None` when out of chrono's range
fn millis_to_rfc3339(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms).single().map(|t| t.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assess;
    use crate::types::EventType;
    use pretty_assertions::assert_eq;

    fn sample_events() -> Vec<ProctorEvent> {
        vec![
            ProctorEvent::new(EventType::FocusLost, 1_705_327_200_000),
            ProctorEvent::new(EventType::FocusGained, 1_705_327_260_000),
            ProctorEvent::new(EventType::Paste, 1_705_327_230_000),
        ]
    }

    #[test]
    fn test_encode_envelope() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let events = sample_events();
        let report = encoder.encode(Some("attempt-7".to_string()), &events, assess(&events));

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.attempt_id.as_deref(), Some("attempt-7"));
        assert_eq!(report.total_events, 3);
        assert_eq!(report.event_summary.get("FOCUS_LOST"), Some(&1));
        assert_eq!(
            report.observed_from_utc.as_deref(),
            Some("2024-01-15T14:00:00+00:00")
        );
        assert_eq!(
            report.observed_to_utc.as_deref(),
            Some("2024-01-15T14:01:00+00:00")
        );
    }

    #[test]
    fn test_empty_log_has_no_window() {
        let encoder = ReportEncoder::new();
        let report = encoder.encode(None, &[], assess(&[]));

        assert_eq!(report.observed_from_utc, None);
        assert_eq!(report.total_events, 0);
        assert!(report.event_summary.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let encoder = ReportEncoder::new();
        let events = sample_events();
        let report = encoder.encode(None, &events, assess(&events));
        let value: serde_json::Value = serde_json::from_str(&encoder.to_json(&report).unwrap()).unwrap();

        assert!(value.get("attempt_id").is_none());
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["assessment"]["level"], "LOW");
        assert_eq!(value["assessment"]["metrics"]["pasteCount"], 1);
        assert!(value["assessment"]["reasons"].as_array().unwrap().is_empty());
        assert!(value["computed_at_utc"].is_string());
    }

    #[test]
    fn test_pretty_json_matches_compact() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let events = sample_events();
        let report = encoder.encode(Some("attempt-7".to_string()), &events, assess(&events));

        let pretty = encoder.to_json_pretty(&report).unwrap();
        assert!(pretty.contains('\n'));

        let compact: AssessmentReport = serde_json::from_str(&encoder.to_json(&report).unwrap()).unwrap();
        let reparsed: AssessmentReport = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, compact);
        assert_eq!(reparsed, report);
    }

    #[test]
    fn test_unique_instance_ids() {
        let a = ReportEncoder::new();
        let b = ReportEncoder::new();
        assert_ne!(a.instance_id, b.instance_id);
    }
}
