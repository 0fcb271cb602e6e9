use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::prelude::*;

pub mod bytecode;
pub mod settings;

pub mod prelude {
    pub use super::Config;
    pub use super::settings::*;
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Raw configuration as it was written. A field is `Some`
/// only when the configuration defines it.
///
/// Use `Settings::resolve` to validate it and fill the defaults.
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<Vec<usize>>,

    /// 0 for random weights, 2 for loading them from `weights_file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub train: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rand: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rand: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_cutoff: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_weights: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_truths: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_after_train: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_weights: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_cases: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<u32>,

    /// Weights file used to populate the network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights_file: Option<String>,

    /// Weights file the trained network is saved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_weights_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_interval: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_distinct: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>
}

#[inline]
fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

impl Config {
    /// Load configuration from the file. Files with `.json`
    /// extension are parsed as JSON, everything else is decoded
    /// as a compiled configuration stream.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let bytes = std::fs::read(path)
            .map_err(|err| Error::io(path, err))?;

        if is_json(path) {
            Ok(serde_json::from_slice(&bytes)?)
        }

        else {
            bytecode::decode(&bytes)
        }
    }

    /// Save configuration to the file, choosing the format
    /// by extension the same way `load` does.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let bytes = if is_json(path) {
            serde_json::to_vec_pretty(self)?
        } else {
            bytecode::encode(self)
        };

        std::fs::write(path, bytes)
            .map_err(|err| Error::io(path, err))
    }
}

#[test]
fn test_config_formats() -> anyhow::Result<()> {
    let config: Config = serde_json::from_str(r#"{
        "topology": [2, 5, 2],
        "num_cases": 4,
        "activation": "tangent",
        "inputs_file": "inputs.bin",
        "outputs_file": "outputs.bin"
    }"#)?;

    assert_eq!(config.topology, Some(vec![2, 5, 2]));
    assert_eq!(config.learning_rate, None);

    let json = crate::files::temp_path("config.json");
    let bin = crate::files::temp_path("config.bin");

    config.save(&json)?;
    config.save(&bin)?;

    assert_eq!(std::fs::read(&bin)?, bytecode::encode(&config));

    assert_eq!(Config::load(&json)?, config);
    assert_eq!(Config::load(&bin)?, config);

    std::fs::write(&json, "{ \"topology\": 5 }")?;

    assert!(matches!(Config::load(&json), Err(Error::Json(_))));

    std::fs::remove_file(&json)?;
    std::fs::remove_file(&bin)?;

    assert!(matches!(Config::load(&bin), Err(Error::Io { .. })));

    Ok(())
}
