//! Simulation log joiner CLI
//!
//! Merges `sim0 .. simN-1` into `final`, summing the `#<count>` lines.

use anyhow::Result;
use clap::Parser;
use pythia_core::{JoinConfig, LogJoiner};
use pythia_tools::{init_logging, join_request, JoinRequest};
use std::path::PathBuf;

/// Join numbered simulation outputs into one file
#[derive(Parser, Debug)]
#[command(name = "join-logs")]
#[command(about = "Join numbered simulation outputs and sum their event counts", long_about = None)]
struct Args {
    /// Number of simulation outputs to join
    #[arg(value_name = "TASK_COUNT", num_args = 0.., allow_negative_numbers = true)]
    task_count: Vec<String>,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the numbered outputs
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Input file prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Aggregate output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let args = Args::parse();

    let task_count = match join_request(&args.task_count, &argv)? {
        JoinRequest::Usage(msg) => {
            println!("{}", msg);
            return Ok(());
        }
        JoinRequest::Run { task_count } => task_count,
    };

    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => JoinConfig::from_json_file(path)?,
        None => JoinConfig::default(),
    };
    if let Some(dir) = args.input_dir {
        config.input_dir = dir;
    }
    if let Some(prefix) = args.prefix {
        config.input_prefix = prefix;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }

    let summary = LogJoiner::new(config).join(task_count)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
