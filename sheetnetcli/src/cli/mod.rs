use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod run;
pub mod truth_table;
pub mod config;
pub mod weights;

#[derive(Parser)]
#[command(name = "sheetnet", about = "Train and run spreadsheet-style feed-forward neural networks")]
pub struct CLI {
    #[arg(long, global = true, default_value = "error")]
    /// Logging filter (`error`, `warn`, `info`, `debug`, `trace`).
    ///
    /// `RUST_LOG` environment variable takes priority.
    log_level: String,

    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
pub enum Command {
    /// Train or run networks described by configuration files.
    ///
    /// Every configuration is loaded and executed independently,
    /// in the given order.
    Run {
        /// Paths to the configuration files, `test.bin` if none given.
        ///
        /// Files with `.json` extension are parsed as JSON, everything
        /// else as compiled configuration.
        configs: Vec<PathBuf>,

        #[arg(long)]
        /// Seed for random weights population, overrides the configured one.
        seed: Option<u64>
    },

    /// Convert text truth table into inputs and expected outputs case files.
    TruthTable {
        /// Path to the text truth table.
        table: PathBuf,

        /// Path to the inputs case file to create.
        inputs: PathBuf,

        /// Path to the expected outputs case file to create.
        outputs: PathBuf
    },

    /// Compile and inspect configuration files.
    Config {
        #[command(subcommand)]
        command: config::ConfigCLI
    },

    /// Inspect weights files.
    Weights {
        #[command(subcommand)]
        command: weights::WeightsCLI
    }
}

impl CLI {
    #[inline]
    pub fn execute(self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();

        match self.command {
            Command::Run { configs, seed } => run::execute(configs, seed),
            Command::TruthTable { table, inputs, outputs } => truth_table::execute(table, inputs, outputs),
            Command::Config { command } => command.execute(),
            Command::Weights { command } => command.execute()
        }
    }
}
