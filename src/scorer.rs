//! Risk scoring and classification
//!
//! The score is a sum over a static, ordered tier table. Tiers for the same
//! signal are cumulative: reaching a higher threshold adds its points on top of
//! every lower tier.

use crate::types::{RiskAssessment, RiskLevel, RiskMetrics};
use tracing::trace;

/// Upper bound of the score
pub const MAX_SCORE: u32 = 100;

/// A derived quantity that can trigger score tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    FocusLostCount,
    TotalFocusLostMinutes,
    LongestFocusLostMinutes,
    RapidSwitchCount,
    PasteCount,
    LargeInsertCount,
    BiggestInsertLen,
    NewCodeLargeInsertCount,
    PasteBurstCount,
    LargeInsertAfterLongFocusLost,
}

impl Signal {
    /// Read this signal's value out of the metrics
    pub fn value(&self, m: &RiskMetrics) -> f64 {
        match self {
            Signal::FocusLostCount => f64::from(m.focus.focus_lost_count),
            Signal::TotalFocusLostMinutes => m.total_focus_lost_min as f64,
            Signal::LongestFocusLostMinutes => m.longest_focus_lost_min as f64,
            Signal::RapidSwitchCount => f64::from(m.focus.rapid_switch_count),
            Signal::PasteCount => f64::from(m.paste.paste_count),
            Signal::LargeInsertCount => f64::from(m.paste.large_insert_count),
            Signal::BiggestInsertLen => m.paste.biggest_insert_len,
            Signal::NewCodeLargeInsertCount => f64::from(m.paste.new_code_large_insert_count),
            Signal::PasteBurstCount => f64::from(m.patterns.paste_burst_count),
            Signal::LargeInsertAfterLongFocusLost => {
                f64::from(m.patterns.large_insert_after_long_focus_lost)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::FocusLostCount => "focusLostCount",
            Signal::TotalFocusLostMinutes => "totalFocusLostMin",
            Signal::LongestFocusLostMinutes => "longestFocusLostMin",
            Signal::RapidSwitchCount => "rapidSwitchCount",
            Signal::PasteCount => "pasteCount",
            Signal::LargeInsertCount => "largeInsertCount",
            Signal::BiggestInsertLen => "biggestInsertLen",
            Signal::NewCodeLargeInsertCount => "newCodeLargeInsertCount",
            Signal::PasteBurstCount => "pasteBurstCount",
            Signal::LargeInsertAfterLongFocusLost => "largeInsertAfterLongFocusLost",
        }
    }
}

/// One row of the scoring table: `signal >= threshold` adds `points`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTier {
    pub signal: Signal,
    pub threshold: i64,
    pub points: u32,
}

const fn tier(signal: Signal, threshold: i64, points: u32) -> ScoreTier {
    ScoreTier {
        signal,
        threshold,
        points,
    }
}

/// Score tiers, evaluated in order and summed
pub const SCORE_TIERS: &[ScoreTier] = &[
    // Focus loss is common, so weights stay low
    tier(Signal::FocusLostCount, 5, 6),
    tier(Signal::FocusLostCount, 10, 8),
    tier(Signal::TotalFocusLostMinutes, 5, 5),
    tier(Signal::TotalFocusLostMinutes, 10, 8),
    tier(Signal::TotalFocusLostMinutes, 20, 12),
    tier(Signal::LongestFocusLostMinutes, 3, 8),
    tier(Signal::LongestFocusLostMinutes, 5, 12),
    tier(Signal::LongestFocusLostMinutes, 10, 18),
    tier(Signal::RapidSwitchCount, 5, 5),
    // Paste activity
    tier(Signal::PasteCount, 1, 8),
    tier(Signal::PasteCount, 3, 15),
    tier(Signal::PasteCount, 6, 25),
    tier(Signal::PasteCount, 10, 35),
    // Large inserts
    tier(Signal::LargeInsertCount, 1, 8),
    tier(Signal::LargeInsertCount, 3, 15),
    tier(Signal::LargeInsertCount, 6, 25),
    tier(Signal::BiggestInsertLen, 200, 10),
    tier(Signal::BiggestInsertLen, 500, 18),
    tier(Signal::BiggestInsertLen, 1000, 25),
    tier(Signal::NewCodeLargeInsertCount, 1, 10),
    tier(Signal::NewCodeLargeInsertCount, 3, 18),
    // Patterns
    tier(Signal::PasteBurstCount, 1, 10),
    tier(Signal::PasteBurstCount, 3, 18),
    tier(Signal::LargeInsertAfterLongFocusLost, 1, 12),
    tier(Signal::LargeInsertAfterLongFocusLost, 3, 20),
];

/// Scorer turning derived metrics into a classified assessment
pub struct RiskScorer;

impl RiskScorer {
    /// Score, classify and explain a set of metrics
    pub fn score(metrics: RiskMetrics) -> RiskAssessment {
        let score = compute_score(&metrics, SCORE_TIERS);
        let level = RiskLevel::from_score(score);
        let reasons = build_reasons(&metrics);

        RiskAssessment {
            score,
            level,
            reasons,
            metrics,
        }
    }
}

/// Sum the points of every triggered tier, clamped to `[0, MAX_SCORE]`
pub fn compute_score(metrics: &RiskMetrics, tiers: &[ScoreTier]) -> u32 {
    let raw: u32 = tiers
        .iter()
        .filter(|t| t.signal.value(metrics) >= t.threshold as f64)
        .inspect(|t| {
            trace!(
                signal = t.signal.as_str(),
                threshold = t.threshold,
                points = t.points,
                "score tier triggered"
            )
        })
        .map(|t| t.points)
        .sum();
    raw.min(MAX_SCORE)
}

/// Human-readable reasons, in fixed evaluation order
fn build_reasons(m: &RiskMetrics) -> Vec<String> {
    let mut reasons = Vec::new();

    if m.paste.paste_count >= 3 {
        reasons.push(format!("{} paste events", m.paste.paste_count));
    }
    if m.paste.large_insert_count >= 3 {
        reasons.push(format!("{} large inserts", m.paste.large_insert_count));
    }
    if m.paste.biggest_insert_len >= 500.0 {
        reasons.push(format!("largest insert {} chars", m.paste.biggest_insert_len));
    }
    if m.total_focus_lost_min >= 10 {
        reasons.push(format!("focus lost total {} min", m.total_focus_lost_min));
    }
    if m.longest_focus_lost_min >= 5 {
        reasons.push(format!("longest focus loss {} min", m.longest_focus_lost_min));
    }
    if m.patterns.paste_burst_count >= 1 {
        reasons.push(format!(
            "paste bursts detected ({})",
            m.patterns.paste_burst_count
        ));
    }
    if m.patterns.large_insert_after_long_focus_lost >= 1 {
        reasons.push(format!(
            "large insert after long focus loss ({})",
            m.patterns.large_insert_after_long_focus_lost
        ));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FocusMetrics, PasteMetrics, PatternMetrics};
    use pretty_assertions::assert_eq;

    fn metrics_with(paste: PasteMetrics, patterns: PatternMetrics) -> RiskMetrics {
        RiskMetrics::new(FocusMetrics::default(), paste, patterns)
    }

    fn focus_ms(total: i64, longest: i64) -> RiskMetrics {
        RiskMetrics::new(
            FocusMetrics {
                focus_lost_count: 1,
                total_focus_lost_time_ms: total,
                avg_focus_lost_time_ms: total as f64,
                longest_focus_lost_time_ms: longest,
                rapid_switch_count: 0,
            },
            PasteMetrics::default(),
            PatternMetrics::default(),
        )
    }

    #[test]
    fn test_empty_metrics_score_zero() {
        let assessment = RiskScorer::score(RiskMetrics::default());

        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.reasons.is_empty());
    }

    #[test]
    fn test_tiers_are_cumulative() {
        let paste = |paste_count| PasteMetrics {
            paste_count,
            ..PasteMetrics::default()
        };
        let score = |n| compute_score(&metrics_with(paste(n), PatternMetrics::default()), SCORE_TIERS);

        assert_eq!(score(1), 8);
        assert_eq!(score(3), 8 + 15);
        assert_eq!(score(6), 8 + 15 + 25);
        assert_eq!(score(10), 8 + 15 + 25 + 35);
    }

    #[test]
    fn test_score_clamped_to_max() {
        let metrics = metrics_with(
            PasteMetrics {
                paste_count: 12,
                large_insert_count: 7,
                total_large_insert_chars: 9_000.0,
                biggest_insert_len: 2_000.0,
                new_code_large_insert_count: 4,
            },
            PatternMetrics {
                paste_burst_count: 5,
                large_insert_after_long_focus_lost: 3,
            },
        );
        let assessment = RiskScorer::score(metrics);

        assert_eq!(assessment.score, MAX_SCORE);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_fractional_insert_len_against_tiers() {
        let score_len = |len: f64| {
            compute_score(
                &metrics_with(
                    PasteMetrics {
                        biggest_insert_len: len,
                        ..PasteMetrics::default()
                    },
                    PatternMetrics::default(),
                ),
                SCORE_TIERS,
            )
        };

        assert_eq!(score_len(199.9), 0);
        assert_eq!(score_len(499.5), 10);
        assert_eq!(score_len(1_000.5), 10 + 18 + 25);

        let assessment = RiskScorer::score(metrics_with(
            PasteMetrics {
                biggest_insert_len: 512.5,
                ..PasteMetrics::default()
            },
            PatternMetrics::default(),
        ));
        assert_eq!(assessment.reasons, vec!["largest insert 512.5 chars".to_string()]);
    }

    #[test]
    fn test_longest_minutes_rounded_before_threshold() {
        // 70s rounds to 1 minute: below the 3 minute tier
        assert_eq!(compute_score(&focus_ms(70_000, 70_000), SCORE_TIERS), 0);
        // 2.5 minutes rounds up to 3
        assert_eq!(compute_score(&focus_ms(150_000, 150_000), SCORE_TIERS), 8);
        // 4.49 minutes rounds down to 4
        assert_eq!(compute_score(&focus_ms(269_999, 269_999), SCORE_TIERS), 8);
    }

    #[test]
    fn test_focus_time_tiers() {
        // total 20 min, longest 10 min
        let metrics = focus_ms(1_200_000, 600_000);
        assert_eq!(compute_score(&metrics, SCORE_TIERS), (5 + 8 + 12) + (8 + 12 + 18));

        let assessment = RiskScorer::score(metrics);
        assert_eq!(
            assessment.reasons,
            vec![
                "focus lost total 20 min".to_string(),
                "longest focus loss 10 min".to_string(),
            ]
        );
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_reasons_fixed_order() {
        let metrics = metrics_with(
            PasteMetrics {
                paste_count: 4,
                large_insert_count: 3,
                total_large_insert_chars: 1_500.0,
                biggest_insert_len: 700.0,
                new_code_large_insert_count: 0,
            },
            PatternMetrics {
                paste_burst_count: 2,
                large_insert_after_long_focus_lost: 1,
            },
        );
        let assessment = RiskScorer::score(metrics);

        assert_eq!(
            assessment.reasons,
            vec![
                "4 paste events".to_string(),
                "3 large inserts".to_string(),
                "largest insert 700 chars".to_string(),
                "paste bursts detected (2)".to_string(),
                "large insert after long focus loss (1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_reason_guard_independent_of_points() {
        // one or two pastes score points but produce no reason
        let metrics = metrics_with(
            PasteMetrics {
                paste_count: 2,
                ..PasteMetrics::default()
            },
            PatternMetrics::default(),
        );
        let assessment = RiskScorer::score(metrics);

        assert_eq!(assessment.score, 8);
        assert!(assessment.reasons.is_empty());
    }

    #[test]
    fn test_medium_level() {
        let metrics = metrics_with(
            PasteMetrics {
                paste_count: 3,
                ..PasteMetrics::default()
            },
            PatternMetrics::default(),
        );
        let assessment = RiskScorer::score(metrics);

        assert_eq!(assessment.score, 23);
        assert_eq!(assessment.level, RiskLevel::Low);

        let metrics = metrics_with(
            PasteMetrics {
                paste_count: 3,
                large_insert_count: 1,
                ..PasteMetrics::default()
            },
            PatternMetrics::default(),
        );
        let assessment = RiskScorer::score(metrics);
        assert_eq!(assessment.score, 31);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_table_is_ascending_per_signal() {
        for pair in SCORE_TIERS.windows(2) {
            if pair[0].signal == pair[1].signal {
                assert!(pair[0].threshold < pair[1].threshold);
            }
        }
    }
}
