//! Temporal pattern detection
//!
//! Looks for two suspicious shapes in a sorted event sequence:
//! - paste bursts: several pastes packed into a short window
//! - large inserts shortly after a long focus loss

use crate::config::AnalyzerConfig;
use crate::types::{EventType, PatternMetrics, ProctorEvent};
use tracing::trace;

/// Detector for paste bursts and focus-loss / insert correlations
pub struct PatternDetector;

impl PatternDetector {
    /// Run both detections over a sorted event sequence
    pub fn detect(events: &[ProctorEvent], config: &AnalyzerConfig) -> PatternMetrics {
        let paste_timestamps: Vec<i64> = events
            .iter()
            .filter(|e| e.event_type == EventType::Paste)
            .map(|e| e.timestamp)
            .collect();

        PatternMetrics {
            paste_burst_count: count_paste_bursts(
                &paste_timestamps,
                config.paste_burst_window_ms,
                config.paste_burst_min_count,
            ),
            large_insert_after_long_focus_lost: count_inserts_after_long_focus_loss(
                events,
                config.long_focus_loss_ms,
                config.long_focus_insert_min_len,
            ),
        }
    }
}

/// Count pastes that start a burst window.
///
/// Every paste is tried as a window start; overlapping windows each count, so
/// this is the number of burst-starting pastes, not of disjoint bursts.
/// `timestamps` must be sorted ascending.
fn count_paste_bursts(timestamps: &[i64], window_ms: i64, min_count: u32) -> u32 {
    let mut bursts = 0;

    for (i, &start) in timestamps.iter().enumerate() {
        let in_window = 1 + timestamps[i + 1..]
            .iter()
            .take_while(|&&ts| ts.saturating_sub(start) <= window_ms)
            .count() as u32;

        if in_window >= min_count {
            trace!(start, in_window, "paste burst window");
            bursts += 1;
        }
    }

    bursts
}

/// Count large inserts that follow a long focus loss.
///
/// For each `LARGE_INSERT`, scans backward for the nearest `FOCUS_GAINED` and
/// the nearest `FOCUS_LOST` independently. The two need not bound the same
/// interval: a gain with no matching loss can pair with an older loss. This is
/// a heuristic, not an interval query.
fn count_inserts_after_long_focus_loss(
    events: &[ProctorEvent],
    long_loss_ms: i64,
    min_insert_len: i64,
) -> u32 {
    let mut count = 0;

    for (i, event) in events.iter().enumerate() {
        if event.event_type != EventType::LargeInsert {
            continue;
        }

        let mut last_gained: Option<i64> = None;
        let mut last_lost: Option<i64> = None;

        for prior in events[..i].iter().rev() {
            match prior.event_type {
                EventType::FocusGained if last_gained.is_none() => {
                    last_gained = Some(prior.timestamp)
                }
                EventType::FocusLost if last_lost.is_none() => last_lost = Some(prior.timestamp),
                _ => {}
            }
            if last_gained.is_some() && last_lost.is_some() {
                break;
            }
        }

        if let (Some(lost), Some(gained)) = (last_lost, last_gained) {
            let lost_duration = gained.saturating_sub(lost);
            let len = event.insert_len();
            if lost_duration > long_loss_ms && len > min_insert_len as f64 {
                trace!(
                    insert_at = event.timestamp,
                    lost_duration,
                    len,
                    "large insert after long focus loss"
                );
                count += 1;
            }
        }
    }

    count
}
