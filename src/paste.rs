//! Paste and large-insert counting

use crate::types::{EventType, PasteMetrics, ProctorEvent};

/// Analyzer for clipboard and large-insertion activity
pub struct PasteAnalyzer;

impl PasteAnalyzer {
    /// Count and size paste / large-insert events. Order-independent.
    pub fn analyze(events: &[ProctorEvent]) -> PasteMetrics {
        let mut metrics = PasteMetrics::default();

        for event in events {
            match event.event_type {
                EventType::Paste => metrics.paste_count += 1,
                EventType::LargeInsert => {
                    let len = event.insert_len();
                    metrics.large_insert_count += 1;
                    metrics.total_large_insert_chars += len;
                    metrics.biggest_insert_len = metrics.biggest_insert_len.max(len);
                    if event.is_new_code() {
                        metrics.new_code_large_insert_count += 1;
                    }
                }
                _ => {}
            }
        }

        metrics
    }
}
