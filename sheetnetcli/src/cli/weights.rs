use std::path::PathBuf;

use clap::Subcommand;
use colorful::Colorful;

use sheetnetlib::prelude::*;

#[derive(Subcommand)]
pub enum WeightsCLI {
    /// Print weights stored in the file.
    Show {
        /// Path to the weights file.
        file: PathBuf,

        #[arg(long, short)]
        /// Network topology the weights belong to, e.g. `2-5-2`.
        topology: Topology
    }
}

impl WeightsCLI {
    #[inline]
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Show { file, topology } => {
                match load_weights(&file, &topology) {
                    Ok(weights) => {
                        println!("📖 {} weights of {} network", topology.weights_count(), topology.to_string().yellow());
                        print!("{weights}");
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to load weights: {err}").red())
                }
            }
        }

        Ok(())
    }
}
