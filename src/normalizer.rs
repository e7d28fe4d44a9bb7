//! Event normalization
//!
//! Orders a raw event collection chronologically. Input order is tolerated in
//! any shape; the caller's collection is never modified.

use crate::types::ProctorEvent;

/// Normalizer for raw event collections
pub struct EventNormalizer;

impl EventNormalizer {
    /// Return a copy of `events` sorted by timestamp ascending.
    ///
    /// The sort is stable, so events sharing a timestamp keep their input order.
    pub fn normalize(events: &[ProctorEvent]) -> Vec<ProctorEvent> {
        let mut sorted = events.to_vec();
        sorted.sort_by_key(|e| e.timestamp);
        sorted
    }

    /// Same as [`normalize`](Self::normalize), treating an absent collection as empty
    pub fn normalize_opt(events: Option<&[ProctorEvent]>) -> Vec<ProctorEvent> {
        events.map(Self::normalize).unwrap_or_default()
    }
}
