//! Classense CLI - Command-line interface for the engagement engine
//!
//! Commands:
//! - analyze: Analyze pose sequences into engagement reports
//! - validate: Check pose sequence input against the engine contract
//! - config: Print the active configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use classense::adapter::parse_sequence;
use classense::pipeline::EngagementProcessor;
use classense::{EngineConfig, ENGINE_VERSION};

/// Classense - behavioral feature extraction for classroom engagement
#[derive(Parser)]
#[command(name = "classense")]
#[command(author = "Classense Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze pose sequences into engagement signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze pose sequences into engagement reports
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Classroom baseline movement score for comparison
        #[arg(long)]
        movement_baseline: Option<f64>,

        /// Classroom baseline attention ratio for comparison
        #[arg(long)]
        attention_baseline: Option<f64>,
    },

    /// Check pose sequence input against the engine contract
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,
    },

    /// Print the active configuration as JSON
    Config {
        /// Configuration file to load and echo; defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A single JSON pose sequence
    Json,
    /// Newline-delimited JSON (one pose sequence per line)
    Ndjson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            config,
            movement_baseline,
            attention_baseline,
        } => run_analyze(
            &input,
            &output,
            input_format,
            config.as_deref(),
            movement_baseline,
            attention_baseline,
        ),
        Commands::Validate {
            input,
            input_format,
        } => run_validate(&input, input_format),
        Commands::Config { config } => run_config(config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_analyze(
    input: &std::path::Path,
    output: &std::path::Path,
    input_format: InputFormat,
    config_path: Option<&std::path::Path>,
    movement_baseline: Option<f64>,
    attention_baseline: Option<f64>,
) -> Result<ExitCode, String> {
    let config = load_config(config_path)?;
    let mut processor = EngagementProcessor::with_config(config);

    let sequences = read_sequences(input, &input_format)?;
    let mut reports = Vec::with_capacity(sequences.len());

    for (index, sequence) in sequences.iter().enumerate() {
        let report = match (movement_baseline, attention_baseline) {
            (Some(movement), Some(attention)) => {
                processor.process_with_baseline(sequence, movement, attention)
            }
            (None, None) => processor.process(sequence),
            _ => {
                return Err(
                    "provide both --movement-baseline and --attention-baseline, or neither"
                        .to_string(),
                )
            }
        }
        .map_err(|e| format!("sequence {}: {}", index + 1, e))?;
        reports.push(report);
    }

    let rendered = match input_format {
        InputFormat::Json => reports.join("\n"),
        InputFormat::Ndjson => reports
            .iter()
            .map(|report| compact_json(report))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
    };

    write_output(output, &rendered)?;
    Ok(ExitCode::SUCCESS)
}

fn run_validate(input: &std::path::Path, input_format: InputFormat) -> Result<ExitCode, String> {
    let sequences = read_sequences(input, &input_format)?;

    let mut failures = 0usize;
    for (index, sequence) in sequences.iter().enumerate() {
        match parse_sequence(sequence) {
            Ok(frames) => {
                let present = frames.iter().flatten().count();
                println!(
                    "sequence {}: ok ({} frames, {} present)",
                    index + 1,
                    frames.len(),
                    present
                );
            }
            Err(e) => {
                failures += 1;
                println!("sequence {}: invalid - {}", index + 1, e);
            }
        }
    }

    if failures > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_config(config_path: Option<&std::path::Path>) -> Result<ExitCode, String> {
    let config = load_config(config_path)?;
    let json = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig, String> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            EngineConfig::from_json(&json).map_err(|e| e.to_string())
        }
    }
}

fn read_sequences(
    input: &std::path::Path,
    format: &InputFormat,
) -> Result<Vec<String>, String> {
    let raw = read_input(input)?;
    match format {
        InputFormat::Json => Ok(vec![raw]),
        InputFormat::Ndjson => Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

fn read_input(input: &std::path::Path) -> Result<String, String> {
    if input.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading from stdin; pipe a pose sequence or press Ctrl-D to end");
        }
        let mut buffer = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("cannot read stdin: {}", e))?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).map_err(|e| format!("cannot read {}: {}", input.display(), e))
    }
}

fn write_output(output: &std::path::Path, content: &str) -> Result<(), String> {
    if output.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", content).map_err(|e| format!("cannot write stdout: {}", e))
    } else {
        fs::write(output, format!("{}\n", content))
            .map_err(|e| format!("cannot write {}: {}", output.display(), e))
    }
}

fn compact_json(json: &str) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    serde_json::to_string(&value).map_err(|e| e.to_string())
}
