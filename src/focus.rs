//! Focus-loss analysis
//!
//! Pairs `FOCUS_LOST` / `FOCUS_GAINED` events into intervals over a
//! chronologically sorted sequence and aggregates their durations.

use crate::config::AnalyzerConfig;
use crate::types::{EventType, FocusMetrics, ProctorEvent};

/// Analyzer for focus-loss timing
pub struct FocusAnalyzer;

impl FocusAnalyzer {
    /// Compute focus metrics from a sorted event sequence.
    ///
    /// Only the most recent unresolved loss is tracked: a second `FOCUS_LOST`
    /// before any `FOCUS_GAINED` replaces the pending start. A gain with no
    /// pending loss is ignored. A loss still pending at the end of the sequence
    /// is closed at the last event's timestamp and never counts as a rapid switch.
    pub fn analyze(events: &[ProctorEvent], config: &AnalyzerConfig) -> FocusMetrics {
        let mut focus_lost_count: u32 = 0;
        let mut total: i64 = 0;
        let mut longest: i64 = 0;
        let mut rapid_switch_count: u32 = 0;
        let mut lost_at: Option<i64> = None;

        for event in events {
            match event.event_type {
                EventType::FocusLost => {
                    focus_lost_count += 1;
                    lost_at = Some(event.timestamp);
                }
                EventType::FocusGained => {
                    if let Some(start) = lost_at.take() {
                        let duration = event.timestamp.saturating_sub(start);
                        total = total.saturating_add(duration);
                        longest = longest.max(duration);
                        if duration < config.rapid_switch_threshold_ms {
                            rapid_switch_count += 1;
                        }
                    }
                }
                _ => {}
            }
        }

        // Still unfocused when the log ends
        if let Some(start) = lost_at {
            let end = events.last().map(|e| e.timestamp).unwrap_or(start);
            let duration = end.saturating_sub(start);
            total = total.saturating_add(duration);
            longest = longest.max(duration);
        }

        let avg_focus_lost_time_ms = if focus_lost_count > 0 {
            total as f64 / focus_lost_count as f64
        } else {
            0.0
        };

        FocusMetrics {
            focus_lost_count,
            total_focus_lost_time_ms: total,
            avg_focus_lost_time_ms,
            longest_focus_lost_time_ms: longest,
            rapid_switch_count,
        }
    }
}
