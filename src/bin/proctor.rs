//! Proctor CLI - Command-line interface for proctor-risk
//!
//! Commands:
//! - score: Assess an attempt's event log and print the report
//! - validate: Report data-quality issues in an event log
//! - schema: Print input/output schema information

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use proctor_risk::adapter::{validate_events, AttemptRecord, EventLogAdapter};
use proctor_risk::{AnalyzerConfig, RiskEngine, ScoreError, ENGINE_VERSION};

/// Proctor - Risk scoring for proctored exam event logs
#[derive(Parser)]
#[command(name = "proctor")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score proctored exam attempts from their event logs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess an event log and print the risk report
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "record")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Analyzer thresholds JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Attempt identifier to embed in the report (overrides the record's)
        #[arg(long)]
        attempt_id: Option<String>,

        /// Print only the assessment, without the report envelope
        #[arg(long)]
        bare: bool,
    },

    /// Report data-quality issues in an event log (advisory)
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "record")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Attempt record object with an `events` field, or a bare array
    Record,
    /// JSON array of events
    Json,
    /// Newline-delimited JSON (one event per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Event log input
    Input,
    /// Report output
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
}

fn run(cli: Cli) -> Result<(), ProctorCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            input_format,
            output_format,
            config,
            attempt_id,
            bare,
        } => cmd_score(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            attempt_id,
            bare,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema { schema_type } => {
            cmd_schema(schema_type);
            Ok(())
        }
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    attempt_id: Option<String>,
    bare: bool,
) -> Result<(), ProctorCliError> {
    let engine = match config {
        Some(path) => {
            let config_json = fs::read_to_string(path)?;
            let config = AnalyzerConfig::from_json(&config_json)?;
            debug!(?config, "loaded analyzer config");
            RiskEngine::with_config(config)?
        }
        None => RiskEngine::new(),
    };

    let mut record = read_record(input, &input_format)?;
    if attempt_id.is_some() {
        record.attempt_id = attempt_id;
    }

    let report = engine.assess_record(&record);

    let output_data = if bare {
        match output_format {
            OutputFormat::Json => serde_json::to_string(&report.assessment)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&report.assessment)?,
        }
    } else {
        match output_format {
            OutputFormat::Json => engine.encoder().to_json(&report)?,
            OutputFormat::JsonPretty => engine.encoder().to_json_pretty(&report)?,
        }
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data + "\n")?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), ProctorCliError> {
    let record = read_record(input, &input_format)?;
    let events = record.events();
    let issues = validate_events(events);

    let report = ValidationReport {
        total_events: events.len(),
        issue_count: issues.len(),
        issues: issues
            .iter()
            .map(|issue| ValidationIssueDetail {
                index: issue.index,
                timestamp: issue.timestamp,
                issue: issue.kind.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events: {}", report.total_events);
        println!("Issues:       {}", report.issue_count);

        if !report.issues.is_empty() {
            println!();
            for detail in &report.issues {
                println!(
                    "  - Event {} (t={}): {}",
                    detail.index, detail.timestamp, detail.issue
                );
            }
        }
    }

    if report.issue_count > 0 {
        Err(ProctorCliError::ValidationFailed(report.issue_count))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) {
    match schema_type {
        SchemaType::Input => {
            println!("Input: exam attempt event log");
            println!();
            println!("Attempt record: {{ \"attemptId\"?: string, \"events\": Event[] | null }}");
            println!("A bare Event[] array or NDJSON (one Event per line) is also accepted.");
            println!();
            println!("Event: {{ \"type\": string, \"timestamp\": integer ms, \"meta\"?: object }}");
            println!();
            println!("Recognized types:");
            println!("  FOCUS_LOST    exam window lost focus");
            println!("  FOCUS_GAINED  exam window regained focus");
            println!("  PASTE         clipboard paste");
            println!("  LARGE_INSERT  large text insertion; meta.len (chars), meta.newCode (bool)");
            println!("Any other type is accepted and ignored by scoring.");
        }
        SchemaType::Output => {
            println!("Output: assessment report");
            println!();
            println!("- report_version, producer {{ name, version, instance_id }}");
            println!("- computed_at_utc, attempt_id?, observed_from_utc, observed_to_utc");
            println!("- total_events, event_summary {{ TYPE: count }}");
            println!("- assessment:");
            println!("  - score: 0-100");
            println!("  - level: LOW (<25) | MEDIUM (<60) | HIGH");
            println!("  - reasons: string[]");
            println!("  - metrics: focusLostCount, totalFocusLostTimeMs, avgFocusLostTimeMs,");
            println!("    longestFocusLostTimeMs, rapidSwitchCount, pasteCount, largeInsertCount,");
            println!("    totalLargeInsertChars, biggestInsertLen, newCodeLargeInsertCount,");
            println!("    pasteBurstCount, largeInsertAfterLongFocusLost, totalFocusLostMin,");
            println!("    longestFocusLostMin");
        }
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, ProctorCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading event log from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_record(input: &Path, format: &InputFormat) -> Result<AttemptRecord, ProctorCliError> {
    let data = read_input(input)?;
    let record = match format {
        InputFormat::Record => EventLogAdapter::parse_record(&data)?,
        InputFormat::Json => AttemptRecord::from_events(EventLogAdapter::parse_array(&data)?),
        InputFormat::Ndjson => AttemptRecord::from_events(EventLogAdapter::parse_ndjson(&data)?),
    };
    debug!(events = record.events().len(), "event log loaded");
    Ok(record)
}

// Error handling

#[derive(Debug)]
enum ProctorCliError {
    Io(io::Error),
    Score(ScoreError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for ProctorCliError {
    fn from(e: io::Error) -> Self {
        ProctorCliError::Io(e)
    }
}

impl From<ScoreError> for ProctorCliError {
    fn from(e: ScoreError) -> Self {
        ProctorCliError::Score(e)
    }
}

impl From<serde_json::Error> for ProctorCliError {
    fn from(e: serde_json::Error) -> Self {
        ProctorCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ProctorCliError> for CliError {
    fn from(e: ProctorCliError) -> Self {
        match e {
            ProctorCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ProctorCliError::Score(ScoreError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check the analyzer config file".to_string()),
            },
            ProctorCliError::Score(ScoreError::EncodingError(msg)) => CliError {
                code: "ENCODING_ERROR".to_string(),
                message: msg,
                hint: None,
            },
            ProctorCliError::Score(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'proctor schema input' for the expected shape".to_string()),
            },
            ProctorCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ProctorCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} issues found in event log", count),
                hint: Some("Scoring tolerates these; fix them at the event producer".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    issue_count: usize,
    issues: Vec<ValidationIssueDetail>,
}

#[derive(serde::Serialize)]
struct ValidationIssueDetail {
    index: usize,
    timestamp: i64,
    issue: String,
}
