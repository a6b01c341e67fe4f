//! interlace CLI - Command-line interface for the timeline fusion engine
//!
//! Commands:
//! - fuse: Fuse the three producer logs into a timeline
//! - validate: Validate producer log files
//! - schema: Print input/output schema information
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use interlace::adapter::{
    parse_acoustic_log, parse_transcript, parse_visual_log, transcript_to_anchors,
};
use interlace::narrative::{compact, render_lines, TimelineEncoder, TIMELINE_VERSION};
use interlace::summary::ResponseSummarizer;
use interlace::types::AnchorMode;
use interlace::{FusionError, TimelineFuser, ENGINE_VERSION, PRODUCER_NAME};

/// interlace - Multi-modal timeline fusion engine for interview analysis
#[derive(Parser)]
#[command(name = "interlace")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Fuse interview sensor logs into a behavioral timeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fuse transcript, visual, and acoustic logs into a timeline
    Fuse {
        /// Transcript JSON file path (use - for stdin)
        #[arg(short, long)]
        transcript: PathBuf,

        /// Visual frame log JSON file path (use - for stdin)
        #[arg(long)]
        visual: PathBuf,

        /// Acoustic frame log JSON file path (use - for stdin)
        #[arg(long)]
        acoustic: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Pause significance threshold in seconds
        #[arg(long, default_value = "1.5")]
        pause_threshold: f64,

        /// Keep only the first N events (storage-bound prefix)
        #[arg(long)]
        compact: Option<usize>,
    },

    /// Validate producer log files
    Validate {
        /// Transcript JSON file path
        #[arg(short, long)]
        transcript: Option<PathBuf>,

        /// Visual frame log JSON file path
        #[arg(long)]
        visual: Option<PathBuf>,

        /// Acoustic frame log JSON file path
        #[arg(long)]
        acoustic: Option<PathBuf>,

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

    /// Diagnose engine health and configuration
    Doctor {
        /// Probe a transcript file for usable timing data
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Timeline payload as compact JSON
    Json,
    /// Timeline payload as pretty-printed JSON
    JsonPretty,
    /// One timeline event per line
    Ndjson,
    /// Human-readable narrative lines
    Text,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schemas (transcript, visual log, acoustic log)
    Input,
    /// Output schema (interview.timeline.v1)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

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

fn run(cli: Cli) -> Result<(), InterlaceCliError> {
    match cli.command {
        Commands::Fuse {
            transcript,
            visual,
            acoustic,
            output,
            format,
            pause_threshold,
            compact: compact_limit,
        } => cmd_fuse(
            &transcript,
            &visual,
            &acoustic,
            &output,
            format,
            pause_threshold,
            compact_limit,
        ),

        Commands::Validate {
            transcript,
            visual,
            acoustic,
            json,
        } => cmd_validate(
            transcript.as_deref(),
            visual.as_deref(),
            acoustic.as_deref(),
            json,
        ),

        Commands::Schema { schema_type } => cmd_schema(schema_type),

        Commands::Doctor { transcript, json } => cmd_doctor(transcript.as_deref(), json),
    }
}

fn cmd_fuse(
    transcript: &Path,
    visual: &Path,
    acoustic: &Path,
    output: &Path,
    format: OutputFormat,
    pause_threshold: f64,
    compact_limit: Option<usize>,
) -> Result<(), InterlaceCliError> {
    let transcript_json = read_input(transcript)?;
    let visual_json = read_input(visual)?;
    let acoustic_json = read_input(acoustic)?;

    let payload = parse_transcript(&transcript_json)?;
    let visual_log = parse_visual_log(&visual_json)?;
    let acoustic_log = parse_acoustic_log(&acoustic_json)?;

    let (anchors, mode) = match transcript_to_anchors(&payload)? {
        Some((anchors, mode)) => (anchors, Some(mode)),
        None => (Vec::new(), None),
    };

    let fuser = TimelineFuser::with_pause_threshold(pause_threshold);
    let mut timeline = fuser.fuse(
        &anchors,
        mode.unwrap_or(AnchorMode::Word),
        &visual_log,
        &acoustic_log,
    );

    if let Some(limit) = compact_limit {
        timeline = compact(&timeline, limit);
    }

    let summary = ResponseSummarizer::summarize(&anchors, &visual_log, &acoustic_log, &timeline);

    let output_data = match format {
        OutputFormat::Json => {
            let encoder = TimelineEncoder::new();
            let payload = encoder.encode(&timeline, &summary, mode);
            serde_json::to_string(&payload)? + "\n"
        }
        OutputFormat::JsonPretty => {
            let encoder = TimelineEncoder::new();
            encoder.encode_to_json(&timeline, &summary, mode)? + "\n"
        }
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for event in timeline.iter() {
                lines.push(serde_json::to_string(event)?);
            }
            lines.join("\n") + "\n"
        }
        OutputFormat::Text => render_lines(&timeline).join("\n") + "\n",
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    transcript: Option<&Path>,
    visual: Option<&Path>,
    acoustic: Option<&Path>,
    json: bool,
) -> Result<(), InterlaceCliError> {
    if transcript.is_none() && visual.is_none() && acoustic.is_none() {
        return Err(InterlaceCliError::NoInputs);
    }

    let mut checks: Vec<ValidationCheck> = Vec::new();

    if let Some(path) = transcript {
        checks.push(validate_log(path, "transcript", |data| {
            let payload = parse_transcript(data)?;
            match transcript_to_anchors(&payload)? {
                Some((anchors, mode)) => {
                    Ok(format!("{} {}-level anchors", anchors.len(), mode.as_str()))
                }
                None => Ok("no timing data (fusion would produce an empty timeline)".to_string()),
            }
        }));
    }

    if let Some(path) = visual {
        checks.push(validate_log(path, "visual", |data| {
            let frames = parse_visual_log(data)?;
            Ok(format!("{} frames", frames.len()))
        }));
    }

    if let Some(path) = acoustic {
        checks.push(validate_log(path, "acoustic", |data| {
            let frames = parse_acoustic_log(data)?;
            Ok(format!("{} frames", frames.len()))
        }));
    }

    let invalid = checks.iter().filter(|c| !c.valid).count();
    let report = ValidationReport {
        total_logs: checks.len(),
        invalid_logs: invalid,
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        for check in &report.checks {
            let status = if check.valid { "[OK]" } else { "[ERR]" };
            println!("  {} {}: {}", status, check.log, check.message);
        }
    }

    if report.invalid_logs > 0 {
        Err(InterlaceCliError::ValidationFailed(report.invalid_logs))
    } else {
        Ok(())
    }
}

fn validate_log(
    path: &Path,
    log: &str,
    parse: impl Fn(&str) -> Result<String, FusionError>,
) -> ValidationCheck {
    let outcome = read_input(path)
        .map_err(|e| e.to_message())
        .and_then(|data| parse(&data).map_err(|e| e.to_string()));

    match outcome {
        Ok(message) => ValidationCheck {
            log: log.to_string(),
            valid: true,
            message,
        },
        Err(message) => ValidationCheck {
            log: log.to_string(),
            valid: false,
            message,
        },
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), InterlaceCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schemas");
            println!();
            println!("1. transcript - verbose transcription JSON");
            println!("   - words: [{{ word, start, end }}] (preferred, high precision)");
            println!("   - segments: [{{ text, start, end }}] (fallback, low precision)");
            println!("   - neither present: fusion produces an empty timeline");
            println!();
            println!("2. visual log - JSON array of sampled frames (2-5 fps)");
            println!("   - timestamp (seconds), pitch/yaw (degrees, signed)");
            println!("   - gaze: Screen | Up | Down | Left | Right");
            println!("   - emotion: Neutral | Happy | Surprise | Sad | Anger | Disgust | Fear | Contempt");
            println!();
            println!("3. acoustic log - JSON array of sampled frames (10 fps)");
            println!("   - timestamp (seconds), pitch (Hz, 0 = unvoiced/silence)");
        }
        SchemaType::Output => {
            println!("Output Schema: {}", TIMELINE_VERSION);
            println!();
            println!("- timeline_version: Schema version");
            println!("- producer: {{ name, version, instance_id }}");
            println!("- computed_at_utc: Encoding timestamp");
            println!("- granularity: word | segment | null");
            println!("- events: Chronological array; branch on 'kind':");
            println!("  - behavior: {{ range, spoken_text, posture, dominant_gaze,");
            println!("                micro_expression, voice_pitch_hz }}");
            println!("  - pause: {{ range, duration_sec, gaze_state }}");
            println!("- summary: {{ words_per_minute, voiced pitch stats, gaze/pose");
            println!("             percentages, pause totals, froze }}");
        }
    }

    Ok(())
}

fn cmd_doctor(transcript: Option<&Path>, json: bool) -> Result<(), InterlaceCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("interlace version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "timeline_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Output schema: {}", TIMELINE_VERSION),
    });

    if let Some(transcript_path) = transcript {
        if transcript_path.exists() {
            let check = match fs::read_to_string(transcript_path)
                .map_err(InterlaceCliError::from)
                .and_then(|data| Ok(parse_transcript(&data)?))
                .and_then(|payload| Ok(transcript_to_anchors(&payload)?))
            {
                Ok(Some((anchors, mode))) => DoctorCheck {
                    name: "transcript".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Transcript valid ({} {}-level anchors)",
                        anchors.len(),
                        mode.as_str()
                    ),
                },
                Ok(None) => DoctorCheck {
                    name: "transcript".to_string(),
                    status: CheckStatus::Warning,
                    message: "Transcript has no timing data; fusion would produce an empty timeline"
                        .to_string(),
                },
                Err(e) => DoctorCheck {
                    name: "transcript".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid transcript: {}", e.to_message()),
                },
            };
            checks.push(check);
        } else {
            checks.push(DoctorCheck {
                name: "transcript".to_string(),
                status: CheckStatus::Warning,
                message: "Transcript file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for - inputs)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("interlace Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(InterlaceCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, InterlaceCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

// Error types

#[derive(Debug)]
enum InterlaceCliError {
    Io(io::Error),
    Fusion(FusionError),
    Json(serde_json::Error),
    NoInputs,
    ValidationFailed(usize),
    DoctorFailed,
}

impl InterlaceCliError {
    fn to_message(&self) -> String {
        match self {
            InterlaceCliError::Io(e) => e.to_string(),
            InterlaceCliError::Fusion(e) => e.to_string(),
            InterlaceCliError::Json(e) => e.to_string(),
            InterlaceCliError::NoInputs => "No input files given".to_string(),
            InterlaceCliError::ValidationFailed(count) => {
                format!("{} logs failed validation", count)
            }
            InterlaceCliError::DoctorFailed => "One or more health checks failed".to_string(),
        }
    }
}

impl From<io::Error> for InterlaceCliError {
    fn from(e: io::Error) -> Self {
        InterlaceCliError::Io(e)
    }
}

impl From<FusionError> for InterlaceCliError {
    fn from(e: FusionError) -> Self {
        InterlaceCliError::Fusion(e)
    }
}

impl From<serde_json::Error> for InterlaceCliError {
    fn from(e: serde_json::Error) -> Self {
        InterlaceCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InterlaceCliError> for CliError {
    fn from(e: InterlaceCliError) -> Self {
        match e {
            InterlaceCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InterlaceCliError::Fusion(e) => CliError {
                code: "FUSION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'interlace validate' on the input logs".to_string()),
            },
            InterlaceCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InterlaceCliError::NoInputs => CliError {
                code: "NO_INPUTS".to_string(),
                message: "No input files given".to_string(),
                hint: Some("Pass at least one of --transcript, --visual, --acoustic".to_string()),
            },
            InterlaceCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} logs failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            InterlaceCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_logs: usize,
    invalid_logs: usize,
    checks: Vec<ValidationCheck>,
}

#[derive(serde::Serialize)]
struct ValidationCheck {
    log: String,
    valid: bool,
    message: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
