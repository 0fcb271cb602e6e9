use std::path::PathBuf;

use crate::prelude::*;

pub const DEFAULT_LEARNING_RATE: f64 = 0.3;
pub const DEFAULT_MIN_RAND: f64 = -1.5;
pub const DEFAULT_MAX_RAND: f64 = 1.5;
pub const DEFAULT_ERROR_CUTOFF: f64 = 2e-4;
pub const DEFAULT_MAX_ITERATIONS: u32 = 100_000;
pub const DEFAULT_OUTPUT_WEIGHTS_FILE: &str = "weights.bin";

#[derive(Debug, Clone, PartialEq)]
/// Validated configuration with every default filled in.
pub struct Settings {
    pub topology: Topology,
    pub activation: Activation,
    pub population: Population,

    /// Seed of the weights generator, entropy seeded when `None`.
    pub seed: Option<u64>,

    pub train: bool,
    pub run_after_train: bool,
    pub learning_rate: f64,
    pub error_cutoff: f64,
    pub max_iterations: u64,
    pub keep_alive: u64,

    pub num_cases: usize,
    pub inputs_file: PathBuf,
    pub outputs_file: Option<PathBuf>,

    pub print_weights: bool,
    pub print_truths: bool,

    pub save_weights: bool,
    pub output_weights_file: PathBuf,
    pub save_interval: u64,
    pub save_distinct: bool,

    /// Every default applied while resolving the configuration.
    pub warnings: Vec<String>
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("{message}");

    warnings.push(message);
}

/// Take the defined value or apply the default with a warning.
fn or_default<T: std::fmt::Debug>(warnings: &mut Vec<String>, value: Option<T>, name: &str, default: T) -> T {
    match value {
        Some(value) => value,

        None => {
            warn(warnings, format!("{name} is not defined, using default value {default:?}"));

            default
        }
    }
}

impl Settings {
    /// Validate raw configuration and fill undefined fields
    /// with their defaults.
    ///
    /// Fails with `Error::ConfigIncomplete` when the topology, cases
    /// count, inputs file or, for training, outputs file is missing.
    pub fn resolve(config: &Config) -> Result<Self> {
        let mut warnings = Vec::new();

        let train = or_default(&mut warnings, config.train, "train", true);

        let mut missing = Vec::new();

        if config.topology.is_none() {
            missing.push("topology");
        }

        if config.num_cases.is_none() {
            missing.push("num_cases");
        }

        if config.inputs_file.is_none() {
            missing.push("inputs_file");
        }

        if train && config.outputs_file.is_none() {
            missing.push("outputs_file");
        }

        let (Some(layers), Some(num_cases), Some(inputs_file), true) = (
            config.topology.as_ref(),
            config.num_cases,
            config.inputs_file.as_ref(),
            missing.is_empty()
        ) else {
            return Err(Error::ConfigIncomplete { missing });
        };

        let topology = Topology::new(layers.as_slice())?;

        if train {
            topology.ensure_trainable()?;
        }

        if num_cases == 0 {
            return Err(Error::InvalidCases(String::from("num_cases must be positive")));
        }

        let learning_rate = or_default(&mut warnings, config.learning_rate, "learning_rate", DEFAULT_LEARNING_RATE);

        let mut min = or_default(&mut warnings, config.min_rand, "min_rand", DEFAULT_MIN_RAND);
        let mut max = or_default(&mut warnings, config.max_rand, "max_rand", DEFAULT_MAX_RAND);

        if min > max {
            warn(&mut warnings, format!("min_rand {min} is greater than max_rand {max}, swapping them"));

            std::mem::swap(&mut min, &mut max);
        }

        let population = match (config.population, &config.weights_file) {
            (Some(0), _) => Population::Random { min, max },

            (Some(2), Some(path)) => Population::File {
                path: PathBuf::from(path),
                min,
                max
            },

            (Some(2), None) => {
                warn(&mut warnings, String::from("population from file requested without weights_file, using random weights"));

                Population::Random { min, max }
            }

            (Some(method), _) => {
                warn(&mut warnings, format!("unsupported population method {method}, using random weights"));

                Population::Random { min, max }
            }

            (None, _) => {
                warn(&mut warnings, String::from("population is not defined, using random weights"));

                Population::Random { min, max }
            }
        };

        let activation = match &config.activation {
            Some(name) => match Activation::lookup(name) {
                Some(activation) => activation,

                None => {
                    warn(&mut warnings, format!("unknown activation function {name:?}, using {}", Activation::default()));

                    Activation::default()
                }
            }

            None => {
                warn(&mut warnings, format!("activation is not defined, using {}", Activation::default()));

                Activation::default()
            }
        };

        let outputs_file = config.outputs_file.as_ref().map(PathBuf::from);

        let mut print_truths = or_default(&mut warnings, config.print_truths, "print_truths", true);

        if print_truths && outputs_file.is_none() {
            warn(&mut warnings, String::from("print_truths requires outputs_file, truth table is disabled"));

            print_truths = false;
        }

        let settings = Self {
            topology,
            activation,
            population,
            seed: config.seed,

            train,
            run_after_train: or_default(&mut warnings, config.run_after_train, "run_after_train", true),
            learning_rate,
            error_cutoff: or_default(&mut warnings, config.error_cutoff, "error_cutoff", DEFAULT_ERROR_CUTOFF),
            max_iterations: or_default(&mut warnings, config.max_iterations, "max_iterations", DEFAULT_MAX_ITERATIONS) as u64,
            keep_alive: or_default(&mut warnings, config.keep_alive, "keep_alive", 0) as u64,

            num_cases,
            inputs_file: PathBuf::from(inputs_file),
            outputs_file,

            print_weights: or_default(&mut warnings, config.print_weights, "print_weights", false),
            print_truths,

            save_weights: or_default(&mut warnings, config.save_weights, "save_weights", false),
            output_weights_file: PathBuf::from(or_default(
                &mut warnings,
                config.output_weights_file.as_deref(),
                "output_weights_file",
                DEFAULT_OUTPUT_WEIGHTS_FILE
            )),
            save_interval: or_default(&mut warnings, config.save_interval, "save_interval", 0) as u64,
            save_distinct: or_default(&mut warnings, config.save_distinct, "save_distinct", false),

            warnings
        };

        Ok(settings)
    }

    /// Training loop configured by these settings.
    pub fn trainer(&self) -> Trainer {
        let trainer = Trainer::default()
            .with_learn_rate(self.learning_rate)
            .with_error_threshold(self.error_cutoff)
            .with_max_iterations(self.max_iterations)
            .with_keep_alive(self.keep_alive);

        if self.save_weights && self.save_interval > 0 {
            let snapshots = Snapshots::new(&self.output_weights_file, self.save_interval)
                .with_distinct_files(self.save_distinct);

            trainer.with_snapshots(snapshots)
        }

        else {
            trainer
        }
    }

    /// Random numbers generator for weights population.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new()
        }
    }
}

#[cfg(test)]
fn minimal_config() -> Config {
    Config {
        topology: Some(vec![2, 5, 2]),
        num_cases: Some(4),
        inputs_file: Some(String::from("inputs.bin")),
        outputs_file: Some(String::from("outputs.bin")),
        ..Config::default()
    }
}

#[test]
fn test_resolve_defaults() -> anyhow::Result<()> {
    let settings = Settings::resolve(&minimal_config())?;

    assert_eq!(settings.topology.to_string(), "2-5-2");
    assert_eq!(settings.activation, Activation::Sigmoid);
    assert_eq!(settings.population, Population::Random { min: -1.5, max: 1.5 });
    assert_eq!(settings.seed, None);

    assert!(settings.train);
    assert!(settings.run_after_train);
    assert_eq!(settings.learning_rate, 0.3);
    assert_eq!(settings.error_cutoff, 2e-4);
    assert_eq!(settings.max_iterations, 100_000);
    assert_eq!(settings.keep_alive, 0);

    assert!(!settings.print_weights);
    assert!(settings.print_truths);
    assert!(!settings.save_weights);
    assert_eq!(settings.output_weights_file, PathBuf::from("weights.bin"));
    assert_eq!(settings.save_interval, 0);
    assert!(!settings.save_distinct);

    assert!(settings.warnings.iter().any(|warning| warning.contains("learning_rate")));
    assert!(settings.warnings.iter().any(|warning| warning.contains("activation")));

    assert_eq!(settings.trainer(), Trainer::default());

    Ok(())
}

#[test]
fn test_resolve_defined_fields() -> anyhow::Result<()> {
    let config = Config {
        learning_rate: Some(0.5),
        population: Some(2),
        train: Some(true),
        min_rand: Some(1.0),
        max_rand: Some(-1.0),
        error_cutoff: Some(1e-3),
        max_iterations: Some(10),
        print_weights: Some(true),
        print_truths: Some(true),
        run_after_train: Some(false),
        save_weights: Some(true),
        activation: Some(String::from("TANGENT")),
        keep_alive: Some(5),
        weights_file: Some(String::from("start.bin")),
        output_weights_file: Some(String::from("out/trained.bin")),
        save_interval: Some(2),
        save_distinct: Some(true),
        seed: Some(7),
        ..minimal_config()
    };

    let settings = Settings::resolve(&config)?;

    assert_eq!(settings.activation, Activation::Tangent);

    assert_eq!(settings.population, Population::File {
        path: PathBuf::from("start.bin"),
        min: -1.0,
        max: 1.0
    });

    // Only the swapped bounds are reported.
    assert_eq!(settings.warnings.len(), 1);

    let trainer = settings.trainer();

    assert_eq!(trainer.backpropagation.learn_rate, 0.5);
    assert_eq!(trainer.max_iterations, 10);
    assert_eq!(trainer.keep_alive, 5);
    assert_eq!(trainer.snapshots, Some(Snapshots::new("out/trained.bin", 2).with_distinct_files(true)));

    assert_eq!(settings.rng().u64(..), fastrand::Rng::with_seed(7).u64(..));

    Ok(())
}

#[test]
fn test_resolve_fallbacks() -> anyhow::Result<()> {
    let settings = Settings::resolve(&Config {
        population: Some(2),
        activation: Some(String::from("relu")),
        ..minimal_config()
    })?;

    assert!(settings.population.is_random());
    assert_eq!(settings.activation, Activation::Sigmoid);

    let settings = Settings::resolve(&Config {
        population: Some(1),
        ..minimal_config()
    })?;

    assert!(settings.population.is_random());

    // Running without expected outputs disables the truth table.
    let settings = Settings::resolve(&Config {
        train: Some(false),
        outputs_file: None,
        ..minimal_config()
    })?;

    assert!(!settings.print_truths);
    assert_eq!(settings.outputs_file, None);

    Ok(())
}

#[test]
fn test_resolve_incomplete() {
    let err = Settings::resolve(&Config::default()).expect_err("nothing is defined");

    match err {
        Error::ConfigIncomplete { missing } => {
            assert_eq!(missing, ["topology", "num_cases", "inputs_file", "outputs_file"]);
        }

        err => panic!("unexpected error: {err}")
    }

    let config = Config {
        outputs_file: None,
        ..minimal_config()
    };

    assert!(matches!(Settings::resolve(&config), Err(Error::ConfigIncomplete { .. })));

    let config = Config {
        num_cases: Some(0),
        ..minimal_config()
    };

    assert!(Settings::resolve(&config).is_err());

    let config = Config {
        topology: Some(vec![2, 2]),
        ..minimal_config()
    };

    assert!(matches!(Settings::resolve(&config), Err(Error::InvalidTopology(_))));

    // Shallow networks can still be run.
    let config = Config {
        topology: Some(vec![2, 2]),
        train: Some(false),
        ..minimal_config()
    };

    assert!(Settings::resolve(&config).is_ok());
}
