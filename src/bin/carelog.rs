//! Carelog CLI - Command-line interface for the carelog analytics engine
//!
//! Commands:
//! - analyze: run one metric family (or all of them) over an NDJSON record export
//! - validate: check an NDJSON record export line by line

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use carelog::{
    AnalysisConfig, Engine, InMemorySource, MetricFamily, RawActivityRecord, CARELOG_VERSION,
};

/// Carelog - analytics over child-care activity logs
#[derive(Parser)]
#[command(name = "carelog")]
#[command(version = CARELOG_VERSION)]
#[command(about = "Compute statistics and anomaly flags over activity logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analyzers over an NDJSON export of raw activity records
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Metric family to run, or "all"
        #[arg(short, long, default_value = "all")]
        metric: String,

        /// Subject to analyze
        #[arg(short, long)]
        subject: i64,

        /// Trailing window in days (whole series when omitted)
        #[arg(short, long)]
        days: Option<u32>,

        /// Time-of-day bands for the diaper timing distribution
        #[arg(long, default_value = "6")]
        bins: u32,

        /// Consecutive-big-poo run length that triggers an alert
        #[arg(long, default_value = "2")]
        poo_threshold: u32,

        /// Change gap in hours that triggers an alert
        #[arg(long, default_value = "5.0")]
        gap_hours: f64,

        /// Group frequency/interval output by subject
        #[arg(long)]
        by_subject: bool,

        /// Pretty-print the JSON output (default when stdout is a terminal)
        #[arg(long)]
        pretty: bool,
    },

    /// Validate an NDJSON record export
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output the validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            metric,
            subject,
            days,
            bins,
            poo_threshold,
            gap_hours,
            by_subject,
            pretty,
        } => {
            let mut config = AnalysisConfig::new(subject);
            config.lookback_days = days;
            config.timing_bins = bins;
            config.big_poo_threshold = poo_threshold;
            config.max_gap_hours = gap_hours;
            config.by_subject = by_subject;
            run_analyze(&input, &metric, &config, pretty)
        }
        Commands::Validate { input, json } => run_validate(&input, json),
    }
}

fn run_analyze(input: &PathBuf, metric: &str, config: &AnalysisConfig, pretty: bool) -> ExitCode {
    let records = match read_records(input) {
        Ok(records) => records,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let engine = Engine::new(Box::new(InMemorySource::new(records)));

    let reports = if metric == "all" {
        engine.analyze_all(config)
    } else {
        match MetricFamily::from_str(metric) {
            Ok(family) => engine.analyze(family, config).map(|report| vec![report]),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    };

    let reports = match reports {
        Ok(reports) => reports,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let pretty = pretty || atty::is(atty::Stream::Stdout);
    for report in &reports {
        let encoded = if pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        match encoded {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to encode report: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(input: &PathBuf, json: bool) -> ExitCode {
    let content = match read_input(input) {
        Ok(content) => content,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let mut valid = 0usize;
    let mut errors: Vec<(usize, String)> = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawActivityRecord>(line) {
            Ok(_) => valid += 1,
            Err(err) => errors.push((number + 1, err.to_string())),
        }
    }

    if json {
        let report = serde_json::json!({
            "valid": valid,
            "invalid": errors.len(),
            "errors": errors
                .iter()
                .map(|(line, error)| serde_json::json!({ "line": line, "error": error }))
                .collect::<Vec<_>>(),
        });
        println!("{report}");
    } else {
        for (line, error) in &errors {
            eprintln!("line {line}: {error}");
        }
        println!("{valid} valid record(s), {} invalid", errors.len());
    }

    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_records(input: &PathBuf) -> Result<Vec<RawActivityRecord>, String> {
    let content = read_input(input)?;
    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: RawActivityRecord = serde_json::from_str(line)
            .map_err(|err| format!("line {}: {err}", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn read_input(input: &PathBuf) -> Result<String, String> {
    if input.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| format!("failed to read stdin: {err}"))?;
        Ok(buffer)
    } else {
        fs::read_to_string(input)
            .map_err(|err| format!("failed to read {}: {err}", input.display()))
    }
}
