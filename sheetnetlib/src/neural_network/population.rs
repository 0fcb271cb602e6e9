use std::path::PathBuf;

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Strategy used to fill the weights of a freshly built network.
pub enum Population {
    /// Every weight is drawn independently from `[min, max)`.
    Random {
        min: f64,
        max: f64
    },

    /// Load weights from a file. When the file doesn't match the
    /// topology, random values from `[min, max)` are used instead.
    File {
        path: PathBuf,
        min: f64,
        max: f64
    }
}

impl Default for Population {
    #[inline]
    fn default() -> Self {
        Self::Random {
            min: -1.5,
            max: 1.5
        }
    }
}

#[derive(Debug)]
/// Weights produced by a population strategy.
pub struct Populated {
    pub weights: Weights,

    /// Reason the weights file was rejected, if it was.
    pub rejected: Option<Error>
}

impl Population {
    #[inline]
    pub fn is_random(&self) -> bool {
        matches!(self, Self::Random { .. })
    }

    /// Build weights for the topology.
    ///
    /// A weights file of wrong length is not an error: random
    /// weights are returned with the rejection reason. A missing or
    /// unreadable file is.
    pub fn populate(&self, topology: &Topology, rng: &mut fastrand::Rng) -> Result<Populated> {
        match self {
            Self::Random { min, max } => Ok(Populated {
                weights: Weights::random(topology, *min, *max, rng),
                rejected: None
            }),

            Self::File { path, min, max } => {
                match crate::files::weights::load_weights(path, topology) {
                    Ok(weights) => {
                        tracing::debug!(?path, "loaded weights");

                        Ok(Populated {
                            weights,
                            rejected: None
                        })
                    }

                    Err(err) if err.is_dimension_mismatch() => {
                        tracing::warn!(?path, "weights file doesn't match topology {topology}, using random weights: {err}");

                        Ok(Populated {
                            weights: Weights::random(topology, *min, *max, rng),
                            rejected: Some(err)
                        })
                    }

                    Err(err) => Err(err)
                }
            }
        }
    }
}

#[test]
fn test_random_population() -> anyhow::Result<()> {
    let topology = Topology::new([2, 5, 2])?;

    let populated = Population::Random { min: 0.5, max: 1.0 }
        .populate(&topology, &mut fastrand::Rng::with_seed(1))?;

    assert!(populated.rejected.is_none());
    assert!(populated.weights.as_slice().iter().all(|w| (0.5..1.0).contains(w)));

    Ok(())
}

#[test]
fn test_file_population_fallback() -> anyhow::Result<()> {
    let path = crate::files::temp_path("population-weights.bin");
    let topology = Topology::new([2, 3, 1])?;

    let weights = Weights::random(&topology, -1.0, 1.0, &mut fastrand::Rng::with_seed(2));

    crate::files::weights::save_weights(&path, &weights)?;

    let population = Population::File {
        path: path.clone(),
        min: 2.0,
        max: 3.0
    };

    // Exact length is loaded as is.
    let populated = population.populate(&topology, &mut fastrand::Rng::with_seed(3))?;

    assert!(populated.rejected.is_none());
    assert_eq!(populated.weights, weights);

    // One byte short falls back to random weights.
    let mut bytes = std::fs::read(&path)?;

    bytes.pop();

    std::fs::write(&path, bytes)?;

    let populated = population.populate(&topology, &mut fastrand::Rng::with_seed(3))?;

    assert!(populated.rejected.is_some_and(|err| err.is_dimension_mismatch()));
    assert!(populated.weights.as_slice().iter().all(|w| (2.0..3.0).contains(w)));

    std::fs::remove_file(&path)?;

    // Missing file is an error.
    assert!(matches!(population.populate(&topology, &mut fastrand::Rng::with_seed(3)), Err(Error::Io { .. })));

    Ok(())
}
