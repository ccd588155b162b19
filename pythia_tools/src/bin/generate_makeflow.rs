//! Makeflow generator CLI
//!
//! Writes a makeflow declaring N parallel PYTHIA runs and a final join.

use anyhow::Result;
use clap::Parser;
use pythia_core::{FlowConfig, FlowGenerator};
use pythia_tools::init_logging;
use std::path::PathBuf;
use tracing::info;

/// Generate a makeflow for a batch of PYTHIA simulations
#[derive(Parser, Debug)]
#[command(name = "generate-makeflow")]
#[command(about = "Generate a makeflow for a batch of PYTHIA simulations", long_about = None)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of parallel simulation tasks
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    tasks: Option<i64>,

    /// Output makeflow path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Shared settings archive
    #[arg(long)]
    settings_archive: Option<String>,

    /// Simulation executable
    #[arg(long)]
    executable: Option<String>,

    /// Command file passed to the executable
    #[arg(long)]
    command_file: Option<String>,

    /// Joiner executable run by the final rule
    #[arg(long)]
    joiner: Option<String>,

    /// Print the flow to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<FlowConfig> {
        let mut config = match &self.config {
            Some(path) => FlowConfig::from_json_file(path)?,
            None => FlowConfig::default(),
        };
        if let Some(tasks) = self.tasks {
            config.task_count = tasks;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(archive) = self.settings_archive {
            config.settings_archive = archive;
        }
        if let Some(executable) = self.executable {
            config.executable = executable;
        }
        if let Some(command_file) = self.command_file {
            config.command_file = command_file;
        }
        if let Some(joiner) = self.joiner {
            config.joiner = joiner;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let to_stdout = args.stdout;
    let generator = FlowGenerator::new(args.into_config()?);

    if to_stdout {
        let flow = generator.describe()?;
        generator.write_to(&flow, std::io::stdout().lock())?;
        return Ok(());
    }

    let flow = generator.generate()?;
    info!(
        "Run with: makeflow {}",
        generator.config().output_path.display()
    );
    info!("Join target depends on {} simulation outputs", flow.task_count());
    Ok(())
}
