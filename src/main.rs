use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use construct_sieve::config::Config;
use construct_sieve::data::filter::TargetPair;
use construct_sieve::report;
use construct_sieve::session::{RunReport, Session};

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Mean threshold outlier detection for construct-based survey data
#[derive(Parser, Debug)]
#[command(name = "construct-sieve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON config with construct definitions
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Factor for mean-threshold detection; also the overlap threshold
    #[arg(short, long, allow_negative_numbers = true)]
    factor: Option<f64>,

    /// Path to the input data (.csv, .json or .parquet)
    #[arg(short, long)]
    input_file: PathBuf,

    /// List per-construct values for every row
    #[arg(short, long)]
    list_data: bool,

    /// Perform mean threshold outlier detection
    #[arg(short, long)]
    mean_threshold: bool,

    /// Output folder for cleaned data
    #[arg(short, long, default_value = "cleaned_data")]
    output_folder: PathBuf,

    /// Two target constructs, comma separated, for the overlap check
    #[arg(short = 'r', long, value_name = "C1,C2")]
    remove_overlapping_constructs: Option<String>,

    /// Print per-row decisions and enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("{message}");
    ExitCode::from(EXIT_USAGE)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    // All parameter checks happen before anything is loaded or written.
    let filter_selected = cli.mean_threshold || cli.remove_overlapping_constructs.is_some();
    let factor = match cli.factor {
        Some(f) if !f.is_finite() => {
            return Ok(usage_error(&format!("Factor must be a finite number, got {f}.")))
        }
        Some(f) if cli.mean_threshold && f < 0.0 => {
            return Ok(usage_error(&format!(
                "Factor must be non-negative for mean threshold outlier detection, got {f}."
            )))
        }
        Some(f) => Some(f),
        None if cli.mean_threshold => {
            return Ok(usage_error(
                "Factor value is required for mean threshold outlier detection.",
            ))
        }
        None if filter_selected => {
            return Ok(usage_error(
                "Factor value is required for remove overlap constructs detection.",
            ))
        }
        None => None,
    };
    let pair = cli
        .remove_overlapping_constructs
        .as_deref()
        .map(TargetPair::parse)
        .transpose()?;

    if !filter_selected && !cli.list_data {
        log::warn!("No filter selected (use -m and/or -r); nothing will be written");
    }

    let config = Config::load(&cli.config)?;
    let session = Session::open(&config, &cli.input_file, &cli.output_folder)?;
    if let Some(pair) = &pair {
        pair.resolve(session.survey().constructs())?;
    }

    if cli.list_data {
        for line in report::list_rows(session.survey()) {
            println!("{line}");
        }
    }

    if let (true, Some(factor)) = (cli.mean_threshold, factor) {
        let run = session.run_mean_threshold(factor, cli.verbose)?;
        print_run("Mean-threshold", &run, cli.verbose);
    }

    if let (Some(pair), Some(factor)) = (&pair, factor) {
        let run = session.run_overlap(pair, factor, cli.verbose)?;
        print_run("Overlap", &run, cli.verbose);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_run(name: &str, run: &RunReport, verbose: bool) {
    if verbose {
        if let Some(trace) = &run.outcome.trace {
            for line in report::render_trace(trace) {
                println!("{line}");
            }
        }
        println!("{}", report::discarded_line(&run.outcome.discarded));
    }
    println!("{}", report::summary(name, &run.outcome, &run.destination));
}
