use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Run
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => f.write_str("training"),
            Self::Run   => f.write_str("running")
        }
    }
}

#[derive(Debug)]
/// Results of a session execution.
pub struct Report {
    pub mode: Mode,

    /// Final state of the training loop, if trained.
    pub training: Option<TrainingState>,

    /// Network outputs for every case, if the network was run.
    pub outputs: Option<Vec<Vec<f64>>>,

    /// Wall time spent training and running.
    pub elapsed: Duration,

    /// File the final weights were saved to.
    pub saved_weights: Option<PathBuf>,

    /// Reason the final weights couldn't be saved.
    pub save_error: Option<Error>
}

#[derive(Debug)]
/// Network built from resolved settings together with
/// the cases it is trained or run on.
///
/// Everything that can fail is done by `initialize`. After it
/// succeeded `execute` always trains or runs to the end.
pub struct Session {
    settings: Settings,
    network: Network,
    cases: CaseSet,
    print_truths: bool,
    warnings: Vec<String>
}

impl Session {
    /// Build the network, populate its weights and load the cases.
    ///
    /// Weights file not matching the topology falls back to random
    /// weights. Expected outputs file is required for training; when
    /// only running it's loaded for the truth table, which is disabled
    /// if the file can't be used. Every such fallback is recorded
    /// in `warnings`.
    pub fn initialize(settings: Settings) -> Result<Self> {
        let mut warnings = settings.warnings.clone();

        let topology = &settings.topology;

        let populated = settings.population.populate(topology, &mut settings.rng())?;

        if let Some(err) = populated.rejected {
            warnings.push(format!("weights file rejected, using random weights: {err}"));
        }

        let mut network = Network::new(populated.weights, settings.activation);

        if settings.train {
            network = network.with_training_cache()?;
        }

        let inputs = crate::files::cases::load_case_values(
            &settings.inputs_file,
            settings.num_cases,
            topology.input_size()
        )?;

        let mut cases = CaseSet::new(topology.input_size(), inputs)?;
        let mut print_truths = settings.print_truths;

        let outputs = match &settings.outputs_file {
            Some(path) if settings.train || print_truths => {
                let outputs = crate::files::cases::load_case_values(path, settings.num_cases, topology.output_size());

                match outputs {
                    Ok(outputs) => Some(outputs),

                    Err(err) if !settings.train => {
                        tracing::warn!(?path, "truth table is disabled: {err}");

                        warnings.push(format!("truth table is disabled: {err}"));

                        print_truths = false;

                        None
                    }

                    Err(err) => return Err(err)
                }
            }

            _ => None
        };

        if let Some(outputs) = outputs {
            cases = cases.with_expected(topology.output_size(), outputs)?;
        }

        tracing::debug!(
            topology = %topology,
            activation = %settings.activation,
            cases = cases.len(),
            labeled = cases.is_labeled(),
            "session initialized"
        );

        Ok(Self {
            settings,
            network,
            cases,
            print_truths,
            warnings
        })
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[inline]
    pub fn cases(&self) -> &CaseSet {
        &self.cases
    }

    #[inline]
    /// Whether the truth table should be printed. Can be
    /// disabled during initialization.
    pub fn print_truths(&self) -> bool {
        self.print_truths
    }

    #[inline]
    /// Every non-fatal problem found while resolving
    /// settings and initializing the session.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        if self.settings.train {
            Mode::Train
        } else {
            Mode::Run
        }
    }

    /// Run the network on every case and return its outputs.
    pub fn run(&mut self) -> Vec<Vec<f64>> {
        (0..self.cases.len())
            .map(|case| self.network.run(self.cases.input(case)).to_vec())
            .collect()
    }

    /// Train (then run, if enabled) or run the network.
    ///
    /// Final weights are saved after training when weights
    /// saving is enabled. Failing to save them doesn't fail
    /// the execution and is reported in `Report::save_error`.
    pub fn execute(&mut self, observer: &mut impl TrainingObserver) -> Result<Report> {
        let mode = self.mode();
        let started = Instant::now();

        let mut training = None;
        let mut outputs = None;

        match mode {
            Mode::Train => {
                training = Some(self.settings.trainer().train(&mut self.network, &self.cases, observer)?);

                if self.settings.run_after_train {
                    outputs = Some(self.run());
                }
            }

            Mode::Run => outputs = Some(self.run())
        }

        let elapsed = started.elapsed();

        let mut saved_weights = None;
        let mut save_error = None;

        if mode == Mode::Train && self.settings.save_weights {
            let path = &self.settings.output_weights_file;

            match crate::files::weights::save_weights(path, self.network.weights()) {
                Ok(()) => saved_weights = Some(path.clone()),

                Err(err) => {
                    tracing::warn!(?path, "failed to save final weights: {err}");

                    save_error = Some(err);
                }
            }
        }

        Ok(Report {
            mode,
            training,
            outputs,
            elapsed,
            saved_weights,
            save_error
        })
    }
}

#[cfg(test)]
struct Files {
    inputs: PathBuf,
    outputs: PathBuf,
    weights: PathBuf
}

#[cfg(test)]
impl Files {
    fn new(name: &str) -> anyhow::Result<Self> {
        let files = Self {
            inputs: crate::files::temp_path(&format!("{name}-inputs.bin")),
            outputs: crate::files::temp_path(&format!("{name}-outputs.bin")),
            weights: crate::files::temp_path(&format!("{name}-weights.bin"))
        };

        let cases = CaseSet::from_rows([
            ([0.0, 0.0], [0.0, 0.0]),
            ([0.0, 1.0], [1.0, 1.0]),
            ([1.0, 0.0], [1.0, 1.0]),
            ([1.0, 1.0], [0.0, 1.0])
        ])?;

        save_cases(&files.inputs, &files.outputs, &cases)?;

        Ok(files)
    }

    fn config(&self) -> Config {
        Config {
            topology: Some(vec![2, 5, 2]),
            num_cases: Some(4),
            inputs_file: Some(self.inputs.to_string_lossy().to_string()),
            outputs_file: Some(self.outputs.to_string_lossy().to_string()),
            output_weights_file: Some(self.weights.to_string_lossy().to_string()),
            seed: Some(42),
            ..Config::default()
        }
    }

    fn remove(self) -> anyhow::Result<()> {
        for path in [self.inputs, self.outputs, self.weights] {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }

        Ok(())
    }
}

#[test]
fn test_train_then_run_saved_weights() -> anyhow::Result<()> {
    let files = Files::new("session-train")?;

    let config = Config {
        save_weights: Some(true),
        ..files.config()
    };

    let mut session = Session::initialize(Settings::resolve(&config)?)?;

    assert_eq!(session.mode(), Mode::Train);
    assert!(session.network().has_training_cache());
    assert!(session.print_truths());

    let report = session.execute(&mut LogObserver)?;

    let training = report.training.expect("network was trained");

    assert!(training.threshold_hit);
    assert!(!training.cap_reached);

    let trained_outputs = report.outputs.expect("run after train is enabled");

    assert_eq!(trained_outputs.len(), 4);
    assert_eq!(report.saved_weights.as_ref(), Some(&files.weights));
    assert!(report.save_error.is_none());

    // Run the saved network.
    let config = Config {
        train: Some(false),
        population: Some(2),
        weights_file: Some(files.weights.to_string_lossy().to_string()),
        ..files.config()
    };

    let mut session = Session::initialize(Settings::resolve(&config)?)?;

    assert_eq!(session.mode(), Mode::Run);
    assert!(!session.network().has_training_cache());

    let report = session.execute(&mut LogObserver)?;

    assert!(report.training.is_none());
    assert!(report.saved_weights.is_none());
    assert_eq!(report.outputs, Some(trained_outputs));

    files.remove()
}

#[test]
fn test_initialization_fallbacks() -> anyhow::Result<()> {
    let files = Files::new("session-fallbacks")?;

    // Weights file of a different topology.
    crate::files::write_doubles(&files.weights, &[0.5; 7])?;

    let config = Config {
        train: Some(false),
        population: Some(2),
        weights_file: Some(files.weights.to_string_lossy().to_string()),
        outputs_file: Some(String::from("/nonexistent/sheetnet-outputs.bin")),
        ..files.config()
    };

    let session = Session::initialize(Settings::resolve(&config)?)?;

    assert!(session.warnings().iter().any(|warning| warning.contains("weights file rejected")));
    assert!(session.warnings().iter().any(|warning| warning.contains("truth table is disabled")));
    assert!(!session.print_truths());
    assert!(!session.cases().is_labeled());

    // Training can't go without expected outputs.
    let config = Config {
        outputs_file: Some(String::from("/nonexistent/sheetnet-outputs.bin")),
        ..files.config()
    };

    assert!(matches!(Session::initialize(Settings::resolve(&config)?), Err(Error::Io { .. })));

    // Inputs file shorter than the cases count.
    let config = Config {
        num_cases: Some(5),
        ..files.config()
    };

    assert!(Session::initialize(Settings::resolve(&config)?).is_err_and(|err| err.is_dimension_mismatch()));

    files.remove()
}

#[test]
fn test_unsaved_weights_are_reported() -> anyhow::Result<()> {
    let files = Files::new("session-unsaved")?;

    let config = Config {
        max_iterations: Some(3),
        run_after_train: Some(false),
        save_weights: Some(true),
        output_weights_file: Some(String::from("/nonexistent/sheetnet-weights.bin")),
        ..files.config()
    };

    let mut session = Session::initialize(Settings::resolve(&config)?)?;

    let report = session.execute(&mut LogObserver)?;

    assert_eq!(report.training.map(|training| training.iteration), Some(3));
    assert!(report.outputs.is_none());
    assert!(report.saved_weights.is_none());
    assert!(report.save_error.is_some());

    files.remove()
}
