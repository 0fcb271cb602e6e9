use std::path::{Path, PathBuf};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Progress of the training loop. Returned when the loop
/// exits and passed to observers on status reports.
pub struct TrainingState {
    /// Amount of finished iterations (full sweeps over the cases).
    pub iteration: u64,

    /// Average case error of the last iteration.
    pub average_error: f64,

    /// Average error dropped to the error threshold.
    pub threshold_hit: bool,

    /// Iterations limit was reached.
    pub cap_reached: bool
}

/// Receives side effects of the training loop.
pub trait TrainingObserver {
    /// Called every `keep_alive` iterations.
    fn on_status(&mut self, state: &TrainingState) {
        let _ = state;
    }

    /// Called after an attempt to write a weights snapshot.
    fn on_snapshot(&mut self, iteration: u64, path: &Path, result: &Result<()>) {
        let _ = (iteration, path, result);
    }
}

#[derive(Debug, Default, Clone, Copy)]
/// Observer which logs status reports and snapshots with `tracing`.
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_status(&mut self, state: &TrainingState) {
        tracing::info!(
            iteration = state.iteration,
            error = state.average_error,
            "training"
        );
    }

    fn on_snapshot(&mut self, iteration: u64, path: &Path, result: &Result<()>) {
        if result.is_ok() {
            tracing::info!(iteration, ?path, "saved weights snapshot");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Periodic weights saving during training.
pub struct Snapshots {
    /// Output weights file.
    pub path: PathBuf,

    /// Save weights every `interval` iterations, 0 disables snapshots.
    pub interval: u64,

    /// Rotate snapshots over `MAX_FILES` files next to `path`
    /// instead of overwriting it every time.
    pub distinct_files: bool
}

impl Snapshots {
    /// Size of the snapshot files ring.
    pub const MAX_FILES: u64 = 20;

    #[inline]
    pub fn new(path: impl Into<PathBuf>, interval: u64) -> Self {
        Self {
            path: path.into(),
            interval,
            distinct_files: false
        }
    }

    #[inline]
    pub fn with_distinct_files(mut self, distinct_files: bool) -> Self {
        self.distinct_files = distinct_files;

        self
    }

    /// Path the snapshot must be written to after the given
    /// iteration, `None` if no snapshot is due.
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use sheetnetlib::prelude::*;
    ///
    /// let snapshots = Snapshots::new("out/weights.bin", 100)
    ///     .with_distinct_files(true);
    ///
    /// assert_eq!(snapshots.target(50), None);
    /// assert_eq!(snapshots.target(300).as_deref(), Some(Path::new("out/3-weights.bin")));
    /// assert_eq!(snapshots.target(2100).as_deref(), Some(Path::new("out/1-weights.bin")));
    /// ```
    pub fn target(&self, iteration: u64) -> Option<PathBuf> {
        if self.interval == 0 || iteration % self.interval != 0 {
            return None;
        }

        if !self.distinct_files {
            return Some(self.path.clone());
        }

        let index = (iteration / self.interval) % Self::MAX_FILES;

        let Some(name) = self.path.file_name() else {
            return Some(self.path.clone());
        };

        let name = format!("{index}-{}", name.to_string_lossy());

        match self.path.parent() {
            Some(parent) => Some(parent.join(name)),
            None => Some(PathBuf::from(name))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Convergence driven training loop.
///
/// Every iteration sweeps all the cases in order. Each case is
/// trained on, then run again to measure its error. The loop stops
/// when the average error is not above `error_threshold` or when
/// `max_iterations` iterations were made, whichever comes first.
/// At least one iteration is always made.
pub struct Trainer {
    pub backpropagation: Backpropagation,
    pub error_threshold: f64,
    pub max_iterations: u64,

    /// Report status every `keep_alive` iterations, 0 disables reports.
    pub keep_alive: u64,

    pub snapshots: Option<Snapshots>
}

impl Default for Trainer {
    #[inline]
    fn default() -> Self {
        Self {
            backpropagation: Backpropagation::default(),
            error_threshold: 2e-4,
            max_iterations: 100_000,
            keep_alive: 0,
            snapshots: None
        }
    }
}

impl Trainer {
    #[inline]
    pub fn with_learn_rate(mut self, learn_rate: f64) -> Self {
        self.backpropagation.learn_rate = learn_rate;

        self
    }

    #[inline]
    pub fn with_error_threshold(mut self, error_threshold: f64) -> Self {
        self.error_threshold = error_threshold;

        self
    }

    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;

        self
    }

    #[inline]
    pub fn with_keep_alive(mut self, keep_alive: u64) -> Self {
        self.keep_alive = keep_alive;

        self
    }

    #[inline]
    pub fn with_snapshots(mut self, snapshots: Snapshots) -> Self {
        self.snapshots = Some(snapshots);

        self
    }

    /// Train the network on the labeled cases until it converges
    /// or runs out of iterations.
    ///
    /// Everything is validated before the first iteration: the network
    /// must have hidden layers and the cases must be labeled, non-empty
    /// and match the network's input and output sizes.
    pub fn train(
        &self,
        network: &mut Network,
        cases: &CaseSet,
        observer: &mut impl TrainingObserver
    ) -> Result<TrainingState> {
        network.allocate_training_cache()?;

        let topology = network.topology();

        if !cases.is_labeled() {
            return Err(Error::InvalidCases(String::from("training requires expected outputs")));
        }

        if cases.is_empty() {
            return Err(Error::InvalidCases(String::from("training requires at least one case")));
        }

        if cases.input_size() != topology.input_size() || cases.output_size() != topology.output_size() {
            return Err(Error::InvalidCases(format!(
                "cases have {} inputs and {} outputs, network {topology} expects {} and {}",
                cases.input_size(),
                cases.output_size(),
                topology.input_size(),
                topology.output_size()
            )));
        }

        tracing::debug!(
            topology = %topology,
            cases = cases.len(),
            learn_rate = self.backpropagation.learn_rate,
            error_threshold = self.error_threshold,
            max_iterations = self.max_iterations,
            "training started"
        );

        let mut state = TrainingState {
            iteration: 0,
            average_error: 0.0,
            threshold_hit: false,
            cap_reached: false
        };

        loop {
            let mut error = 0.0;

            for case in (0..cases.len()).filter_map(|i| cases.case(i)) {
                self.backpropagation.train_case(network, case.input, case.expected);

                error += case_error(network.run(case.input), case.expected);
            }

            state.average_error = error / cases.len() as f64;
            state.iteration += 1;

            if state.average_error <= self.error_threshold {
                state.threshold_hit = true;
            }

            if state.iteration >= self.max_iterations {
                state.cap_reached = true;
            }

            if self.keep_alive > 0 && state.iteration % self.keep_alive == 0 {
                observer.on_status(&state);
            }

            if let Some(path) = self.snapshots.as_ref().and_then(|snapshots| snapshots.target(state.iteration)) {
                let result = crate::files::weights::save_weights(&path, network.weights());

                if let Err(err) = &result {
                    tracing::warn!(iteration = state.iteration, ?path, "failed to save weights snapshot: {err}");
                }

                observer.on_snapshot(state.iteration, &path, &result);
            }

            if state.threshold_hit || state.cap_reached {
                break;
            }
        }

        tracing::debug!(
            iteration = state.iteration,
            error = state.average_error,
            threshold_hit = state.threshold_hit,
            cap_reached = state.cap_reached,
            "training finished"
        );

        Ok(state)
    }
}

#[cfg(test)]
#[derive(Default)]
struct Recorder {
    statuses: Vec<u64>,
    snapshots: Vec<(u64, PathBuf, bool)>
}

#[cfg(test)]
impl TrainingObserver for Recorder {
    fn on_status(&mut self, state: &TrainingState) {
        self.statuses.push(state.iteration);
    }

    fn on_snapshot(&mut self, iteration: u64, path: &Path, result: &Result<()>) {
        self.snapshots.push((iteration, path.to_path_buf(), result.is_ok()));
    }
}

#[cfg(test)]
fn xor_cases() -> CaseSet {
    CaseSet::from_rows([
        ([0.0, 0.0], [0.0, 0.0]),
        ([0.0, 1.0], [1.0, 1.0]),
        ([1.0, 0.0], [1.0, 1.0]),
        ([1.0, 1.0], [0.0, 1.0])
    ]).expect("valid cases")
}

#[test]
fn test_xor_convergence_injected_weights() -> anyhow::Result<()> {
    let topology = Topology::new([2, 5, 2])?;

    let weights = Weights::from_values(&topology, [
        0.84, -1.12, 0.37, 1.26, -0.58,
        -0.91, 1.05, -0.44, 0.72, 1.33,

        1.17, -0.26,
        -0.83, 0.61,
        0.49, -1.08,
        -1.21, 0.94,
        0.35, 0.77
    ])?;

    let mut network = Network::new(weights, Activation::Sigmoid).with_training_cache()?;

    let state = Trainer::default().train(&mut network, &xor_cases(), &mut LogObserver)?;

    assert!(state.threshold_hit);
    assert!(!state.cap_reached);
    assert!(state.iteration < 100_000);
    assert!(state.average_error <= 2e-4);

    let cases = xor_cases();

    for case in (0..cases.len()).filter_map(|i| cases.case(i)) {
        let output = network.run(case.input);

        for (actual, expected) in output.iter().zip(case.expected) {
            assert!((actual - expected).abs() < 0.05);
        }
    }

    Ok(())
}

#[test]
fn test_xor_convergence_seeded_weights() -> anyhow::Result<()> {
    let topology = Topology::new([2, 5, 2])?;
    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(42));

    let mut network = Network::new(weights, Activation::Sigmoid).with_training_cache()?;

    let trainer = Trainer::default()
        .with_learn_rate(0.3)
        .with_error_threshold(2e-4)
        .with_max_iterations(100_000);

    let state = trainer.train(&mut network, &xor_cases(), &mut LogObserver)?;

    assert!(state.threshold_hit);
    assert!(!state.cap_reached);

    Ok(())
}

#[test]
fn test_iterations_cap() -> anyhow::Result<()> {
    let topology = Topology::new([2, 3, 2])?;
    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(8));

    let network = Network::new(weights, Activation::Sigmoid).with_training_cache()?;

    let mut capped = network.clone();

    let state = Trainer::default()
        .with_max_iterations(5)
        .train(&mut capped, &xor_cases(), &mut LogObserver)?;

    assert_eq!(state.iteration, 5);
    assert!(state.cap_reached);
    assert!(!state.threshold_hit);

    // Zero limit still makes one sweep.
    let mut capped = network.clone();

    let state = Trainer::default()
        .with_max_iterations(0)
        .train(&mut capped, &xor_cases(), &mut LogObserver)?;

    assert_eq!(state.iteration, 1);
    assert!(state.cap_reached);

    // Both conditions on the same iteration set both flags.
    let mut capped = network;

    let state = Trainer::default()
        .with_error_threshold(f64::INFINITY)
        .with_max_iterations(1)
        .train(&mut capped, &xor_cases(), &mut LogObserver)?;

    assert!(state.threshold_hit);
    assert!(state.cap_reached);

    Ok(())
}

#[test]
fn test_status_reports_and_snapshots() -> anyhow::Result<()> {
    let topology = Topology::new([2, 3, 2])?;
    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(13));

    let mut network = Network::new(weights, Activation::Sigmoid).with_training_cache()?;

    let output = crate::files::temp_path("snapshot-weights.bin");

    let trainer = Trainer::default()
        .with_max_iterations(7)
        .with_keep_alive(2)
        .with_snapshots(Snapshots::new(&output, 3));

    let mut recorder = Recorder::default();

    trainer.train(&mut network, &xor_cases(), &mut recorder)?;

    assert_eq!(recorder.statuses, [2, 4, 6]);
    assert_eq!(recorder.snapshots, [(3, output.clone(), true), (6, output.clone(), true)]);

    assert_eq!(std::fs::read(&output)?.len(), topology.weights_count() * crate::files::DOUBLE_BYTES);

    std::fs::remove_file(output)?;

    // Unwritable snapshot target doesn't stop training.
    let missing = std::env::temp_dir()
        .join(format!("sheetnet-{}-missing-folder", std::process::id()))
        .join("weights.bin");

    let trainer = Trainer::default()
        .with_max_iterations(4)
        .with_snapshots(Snapshots::new(&missing, 1).with_distinct_files(true));

    let mut recorder = Recorder::default();

    let state = trainer.train(&mut network, &xor_cases(), &mut recorder)?;

    assert_eq!(state.iteration, 4);
    assert_eq!(recorder.snapshots.len(), 4);
    assert!(recorder.snapshots.iter().all(|(_, _, saved)| !saved));
    assert!(recorder.snapshots[1].1.ends_with("2-weights.bin"));

    Ok(())
}

#[test]
fn test_disabled_status_reports() -> anyhow::Result<()> {
    let topology = Topology::new([2, 3, 2])?;
    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(21));

    // Training caches are allocated by the trainer.
    let mut network = Network::new(weights, Activation::Sigmoid);

    let trainer = Trainer::default()
        .with_max_iterations(5)
        .with_keep_alive(0);

    let mut recorder = Recorder::default();

    let state = trainer.train(&mut network, &xor_cases(), &mut recorder)?;

    assert_eq!(state.iteration, 5);
    assert!(state.cap_reached);
    assert!(network.has_training_cache());
    assert!(recorder.statuses.is_empty());
    assert!(recorder.snapshots.is_empty());

    Ok(())
}

#[test]
fn test_snapshot_ring() {
    let snapshots = Snapshots::new("weights.bin", 10)
        .with_distinct_files(true);

    assert_eq!(snapshots.target(0), Some(PathBuf::from("0-weights.bin")));
    assert_eq!(snapshots.target(15), None);
    assert_eq!(snapshots.target(190), Some(PathBuf::from("19-weights.bin")));
    assert_eq!(snapshots.target(200), Some(PathBuf::from("0-weights.bin")));

    let snapshots = snapshots.with_distinct_files(false);

    assert_eq!(snapshots.target(190), Some(PathBuf::from("weights.bin")));

    assert_eq!(Snapshots::new("weights.bin", 0).target(10), None);
}

#[test]
fn test_training_preconditions() -> anyhow::Result<()> {
    let topology = Topology::new([2, 3, 2])?;
    let weights = Weights::zeros(&topology);

    let mut network = Network::new(weights, Activation::Sigmoid);
    let trainer = Trainer::default().with_max_iterations(1);

    assert!(trainer.train(&mut network, &xor_cases().unlabeled(), &mut LogObserver).is_err());
    assert!(trainer.train(&mut network, &CaseSet::from_rows([([0.0], [1.0, 0.0])])?, &mut LogObserver).is_err());

    let shallow = Topology::new([2, 2])?;
    let mut network = Network::new(Weights::zeros(&shallow), Activation::Sigmoid);

    assert!(matches!(
        trainer.train(&mut network, &xor_cases(), &mut LogObserver),
        Err(Error::InvalidTopology(_))
    ));

    Ok(())
}
