//! Assessment pipeline orchestration
//!
//! This module provides the public API for scoring an exam attempt.
//! Pipeline: Events → Normalizer → {Focus, Paste, Patterns} → Scorer → RiskAssessment

use crate::adapter::{AttemptRecord, EventLogAdapter};
use crate::config::AnalyzerConfig;
use crate::encoder::{AssessmentReport, ReportEncoder};
use crate::error::ScoreError;
use crate::focus::FocusAnalyzer;
use crate::normalizer::EventNormalizer;
use crate::paste::PasteAnalyzer;
use crate::patterns::PatternDetector;
use crate::scorer::RiskScorer;
use crate::types::{ProctorEvent, RiskAssessment, RiskMetrics};
use tracing::{debug, info};

/// Assess a complete event log with the default thresholds (stateless, one-shot).
///
/// Never fails: an empty log yields score 0, level `LOW` and no reasons.
///
/// # Example
/// ```ignore
/// let assessment = assess(&events);
/// println!("{}/100 ({})", assessment.score, assessment.level.as_str());
/// ```
pub fn assess(events: &[ProctorEvent]) -> RiskAssessment {
    run_pipeline(events, &AnalyzerConfig::default())
}

/// Like [`assess`], treating an absent collection as empty
pub fn assess_opt(events: Option<&[ProctorEvent]>) -> RiskAssessment {
    assess(events.unwrap_or_default())
}

/// Parse an attempt record / event array JSON and return the report JSON
pub fn assess_json(json: &str) -> Result<String, ScoreError> {
    RiskEngine::new().assess_json(json)
}

fn run_pipeline(events: &[ProctorEvent], config: &AnalyzerConfig) -> RiskAssessment {
    // Stage 1: Sort a private copy
    let sorted = EventNormalizer::normalize(events);

    // Stage 2: Focus-loss timing
    let focus = FocusAnalyzer::analyze(&sorted, config);
    debug!(
        focus_lost_count = focus.focus_lost_count,
        total_ms = focus.total_focus_lost_time_ms,
        longest_ms = focus.longest_focus_lost_time_ms,
        rapid_switches = focus.rapid_switch_count,
        "focus analysis complete"
    );

    // Stage 3: Paste / insert counts
    let paste = PasteAnalyzer::analyze(&sorted);
    debug!(
        paste_count = paste.paste_count,
        large_insert_count = paste.large_insert_count,
        biggest_insert_len = paste.biggest_insert_len,
        "paste analysis complete"
    );

    // Stage 4: Temporal patterns
    let patterns = PatternDetector::detect(&sorted, config);
    debug!(
        paste_bursts = patterns.paste_burst_count,
        inserts_after_focus_loss = patterns.large_insert_after_long_focus_lost,
        "pattern detection complete"
    );

    // Stage 5: Score and classify
    let assessment = RiskScorer::score(RiskMetrics::new(focus, paste, patterns));
    info!(
        events = events.len(),
        score = assessment.score,
        level = assessment.level.as_str(),
        reasons = assessment.reasons.len(),
        "attempt assessed"
    );

    assessment
}

/// Configurable assessment engine.
///
/// Holds no state between calls: every assessment depends only on its input
/// and the engine's thresholds.
pub struct RiskEngine {
    config: AnalyzerConfig,
    encoder: ReportEncoder,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    /// Create an engine with the default thresholds
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create an engine with custom thresholds
    pub fn with_config(config: AnalyzerConfig) -> Result<Self, ScoreError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Encoder used for this engine's reports
    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    /// Assess an event log
    pub fn assess(&self, events: &[ProctorEvent]) -> RiskAssessment {
        run_pipeline(events, &self.config)
    }

    /// Assess an attempt record and wrap the result in a report envelope
    pub fn assess_record(&self, record: &AttemptRecord) -> AssessmentReport {
        let events = record.events();
        let assessment = self.assess(events);
        self.encoder
            .encode(record.attempt_id.clone(), events, assessment)
    }

    /// Parse JSON input (array or attempt record) and return report JSON
    pub fn assess_json(&self, json: &str) -> Result<String, ScoreError> {
        let record = EventLogAdapter::parse_record(json)?;
        let report = self.assess_record(&record);
        self.encoder.to_json(&report)
    }
}
