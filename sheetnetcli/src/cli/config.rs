use std::path::PathBuf;

use clap::Subcommand;
use colorful::Colorful;

use sheetnetlib::prelude::*;
use sheetnetlib::config::bytecode;

#[derive(Subcommand)]
pub enum ConfigCLI {
    /// Compile JSON configuration into the binary format.
    Compile {
        /// Path to the JSON configuration.
        json: PathBuf,

        /// Path to the compiled configuration to create.
        bin: PathBuf
    },

    /// Print configuration file as JSON.
    Show {
        /// Path to the JSON or compiled configuration.
        config: PathBuf
    }
}

impl ConfigCLI {
    #[inline]
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Compile { json, bin } => {
                println!("⏳ Reading configuration {json:?}...");

                match std::fs::read(&json) {
                    Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                        Ok(config) => match std::fs::write(&bin, bytecode::encode(&config)) {
                            Ok(()) => println!("{}", format!("✅ Configuration compiled into {bin:?}").green()),
                            Err(err) => eprintln!("{}", format!("🧯 Failed to write compiled configuration: {err}").red())
                        }

                        Err(err) => eprintln!("{}", format!("🧯 Failed to parse configuration: {err}").red())
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to read configuration: {err}").red())
                }
            }

            Self::Show { config } => {
                match Config::load(&config) {
                    Ok(config) => println!("{}", serde_json::to_string_pretty(&config)?),
                    Err(err) => eprintln!("{}", format!("🧯 Failed to load configuration: {err}").red())
                }
            }
        }

        Ok(())
    }
}
