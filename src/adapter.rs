//! Event log ingestion
//!
//! Parses the event collection handed over by the record-keeping service and
//! offers advisory checks on it. None of this affects scoring: the pipeline
//! accepts whatever events come out of here.

use crate::error::ScoreError;
use crate::types::{EventType, ProctorEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Proctoring record for one exam attempt as served by the record store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    #[serde(default, alias = "attempt_id", skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
    /// Event collection; `null` or missing means no events were captured
    #[serde(default)]
    pub events: Option<Vec<ProctorEvent>>,
}

impl AttemptRecord {
    pub fn from_events(events: Vec<ProctorEvent>) -> Self {
        Self {
            attempt_id: None,
            events: Some(events),
        }
    }

    pub fn events(&self) -> &[ProctorEvent] {
        self.events.as_deref().unwrap_or(&[])
    }
}

/// Adapter for the supported event log encodings
pub struct EventLogAdapter;

impl EventLogAdapter {
    /// Parse a JSON array of events
    pub fn parse_array(json: &str) -> Result<Vec<ProctorEvent>, ScoreError> {
        let events: Vec<ProctorEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse NDJSON (one event per line, blank lines skipped)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ProctorEvent>, ScoreError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<ProctorEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    return Err(ScoreError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Parse either an attempt record object, a bare event array, or `null`
    pub fn parse_record(json: &str) -> Result<AttemptRecord, ScoreError> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Null => Ok(AttemptRecord::default()),
            Value::Array(_) => Ok(AttemptRecord::from_events(serde_json::from_value(value)?)),
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(ScoreError::ParseError(format!(
                "Expected an attempt record or event array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Count events per type tag, unknown tags included
pub fn summarize_event_types(events: &[ProctorEvent]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.event_type.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Data-quality problem found in an event log
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IssueKind {
    #[error("unknown event type {0}")]
    UnknownType(String),

    #[error("LARGE_INSERT without numeric meta.len")]
    MissingInsertLen,

    #[error("negative meta.len {0}")]
    NegativeInsertLen(f64),

    #[error("FOCUS_GAINED without a preceding FOCUS_LOST")]
    UnpairedFocusGained,
}

/// An issue attached to the input position of the offending event
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Index in the input collection (not the sorted order)
    pub index: usize,
    pub timestamp: i64,
    pub kind: IssueKind,
}

/// Advisory validation of an event log.
///
/// Reports problems the producer should fix; scoring tolerates all of them.
pub fn validate_events(events: &[ProctorEvent]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (index, event) in events.iter().enumerate() {
        let kind = match &event.event_type {
            EventType::Other(tag) => Some(IssueKind::UnknownType(tag.clone())),
            EventType::LargeInsert => {
                let has_numeric_len = event
                    .meta_field("len")
                    .map(Value::is_number)
                    .unwrap_or(false);
                if !has_numeric_len {
                    Some(IssueKind::MissingInsertLen)
                } else if event.insert_len() < 0.0 {
                    Some(IssueKind::NegativeInsertLen(event.insert_len()))
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(kind) = kind {
            issues.push(ValidationIssue {
                index,
                timestamp: event.timestamp,
                kind,
            });
        }
    }

    // Pairing is checked in chronological order, reported by input index
    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by_key(|&i| events[i].timestamp);
    let mut pending_loss = false;
    for index in order {
        match events[index].event_type {
            EventType::FocusLost => pending_loss = true,
            EventType::FocusGained if pending_loss => pending_loss = false,
            EventType::FocusGained => issues.push(ValidationIssue {
                index,
                timestamp: events[index].timestamp,
                kind: IssueKind::UnpairedFocusGained,
            }),
            _ => {}
        }
    }

    issues.sort_by_key(|issue| issue.index);
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_array() {
        let events = EventLogAdapter::parse_array(
            r#"[{"type":"PASTE","timestamp":5},{"type":"FOCUS_LOST","timestamp":1}]"#,
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Paste);
    }

    #[test]
    fn test_parse_array_tolerates_non_object_meta() {
        let events = EventLogAdapter::parse_array(
            r#"[{"type":"PASTE","timestamp":1,"meta":"x"},
                {"type":"LARGE_INSERT","timestamp":2,"meta":[300]},
                {"type":"PASTE","timestamp":3,"meta":7}]"#,
        )
        .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[1].insert_len(), 0.0);

        let assessment = crate::pipeline::assess(&events);
        assert_eq!(assessment.metrics.paste.paste_count, 2);
        assert_eq!(assessment.metrics.paste.large_insert_count, 1);
        assert_eq!(assessment.metrics.paste.biggest_insert_len, 0.0);
        // pastes 8, large inserts 8
        assert_eq!(assessment.score, 16);
    }

    #[test]
    fn test_parse_ndjson() {
        let ndjson = r#"{"type":"FOCUS_LOST","timestamp":1000}

{"type":"FOCUS_GAINED","timestamp":2000}
{"type":"LARGE_INSERT","timestamp":3000,"meta":{"len":320,"newCode":true}}
"#;
        let events = EventLogAdapter::parse_ndjson(ndjson).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[2].insert_len(), 320.0);
        assert!(events[2].is_new_code());
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = "{\"type\":\"PASTE\",\"timestamp\":1}\n{broken\n";
        let err = EventLogAdapter::parse_ndjson(ndjson).unwrap_err();

        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_record_shapes() {
        let record = EventLogAdapter::parse_record(
            r#"{"attemptId":"a-1","events":[{"type":"PASTE","timestamp":1}]}"#,
        )
        .unwrap();
        assert_eq!(record.attempt_id.as_deref(), Some("a-1"));
        assert_eq!(record.events().len(), 1);

        let bare = EventLogAdapter::parse_record(r#"[{"type":"PASTE","timestamp":1}]"#).unwrap();
        assert_eq!(bare.attempt_id, None);
        assert_eq!(bare.events().len(), 1);

        let null_events = EventLogAdapter::parse_record(r#"{"events":null}"#).unwrap();
        assert!(null_events.events().is_empty());

        let missing = EventLogAdapter::parse_record("{}").unwrap();
        assert!(missing.events().is_empty());

        assert!(EventLogAdapter::parse_record("null").unwrap().events().is_empty());
        assert!(EventLogAdapter::parse_record("42").is_err());
    }

    #[test]
    fn test_summarize_event_types() {
        let events = vec![
            ProctorEvent::new(EventType::Paste, 1),
            ProctorEvent::new(EventType::Paste, 2),
            ProctorEvent::new(EventType::FocusLost, 3),
            ProctorEvent::new(EventType::Other("COPY".to_string()), 4),
        ];
        let summary = summarize_event_types(&events);

        assert_eq!(summary.get("PASTE"), Some(&2));
        assert_eq!(summary.get("FOCUS_LOST"), Some(&1));
        assert_eq!(summary.get("COPY"), Some(&1));
        assert_eq!(summary.len(), 3);
    }

    #[test]
    fn test_validate_events() {
        let events = vec![
            ProctorEvent::new(EventType::FocusGained, 500),
            ProctorEvent::new(EventType::FocusLost, 1_000),
            ProctorEvent::new(EventType::LargeInsert, 1_500),
            ProctorEvent::new(EventType::FocusGained, 2_000),
            ProctorEvent::large_insert(2_500, -10, false),
            ProctorEvent::new(EventType::Other("BLINK".to_string()), 3_000),
            ProctorEvent::large_insert(3_500, 400, true),
        ];
        let issues = validate_events(&events);
        let kinds: Vec<(usize, IssueKind)> = issues.into_iter().map(|i| (i.index, i.kind)).collect();

        assert_eq!(
            kinds,
            vec![
                (0, IssueKind::UnpairedFocusGained),
                (2, IssueKind::MissingInsertLen),
                (4, IssueKind::NegativeInsertLen(-10.0)),
                (5, IssueKind::UnknownType("BLINK".to_string())),
            ]
        );
    }

    #[test]
    fn test_validate_clean_log() {
        let events = vec![
            ProctorEvent::new(EventType::FocusLost, 0),
            ProctorEvent::new(EventType::FocusGained, 10),
            ProctorEvent::new(EventType::Paste, 20),
        ];
        assert!(validate_events(&events).is_empty());
    }
}
