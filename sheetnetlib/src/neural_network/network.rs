use crate::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Values only needed while training: pre-activation sums of the
/// hidden layers and backpropagated error signals.
///
/// Both are indexed by activation layer like the activations
/// themselves. Layers that never need a value hold empty vectors:
/// `theta` is filled for hidden layers `1..L`, `psi` for layers
/// `2..=L`. Layer 1 error signals are never stored because nothing
/// propagates behind the input layer.
pub(crate) struct TrainingCache {
    pub(crate) theta: Vec<Vec<f64>>,
    pub(crate) psi: Vec<Vec<f64>>
}

impl TrainingCache {
    pub(crate) fn new(topology: &Topology) -> Self {
        let output = topology.output_layer();

        let theta = (0..topology.activation_layers())
            .map(|alpha| {
                if (1..output).contains(&alpha) {
                    vec![0.0; topology.nodes(alpha)]
                } else {
                    Vec::new()
                }
            })
            .collect();

        let psi = (0..topology.activation_layers())
            .map(|alpha| {
                if alpha >= 2 {
                    vec![0.0; topology.nodes(alpha)]
                } else {
                    Vec::new()
                }
            })
            .collect();

        Self {
            theta,
            psi
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Fully connected feed-forward network stored spreadsheet style:
/// one cell per node and per edge, no per-neuron objects.
///
/// The network is the single owner of its weights and activations.
/// Its topology never changes after construction and weights are
/// only mutated through `apply_weight_delta` and backpropagation.
///
/// ```
/// use sheetnetlib::prelude::*;
///
/// let topology = Topology::new([2, 1, 1]).unwrap();
///
/// // Linear network which sums its two inputs.
/// let weights = Weights::from_values(&topology, [1.0, 1.0, 1.0]).unwrap();
///
/// let mut network = Network::new(weights, Activation::Linear);
///
/// assert_eq!(network.run(&[2.0, 3.0]), &[5.0]);
/// ```
pub struct Network {
    pub(crate) topology: Topology,
    pub(crate) activation: Activation,
    pub(crate) weights: Weights,
    pub(crate) activations: Vec<Vec<f64>>,
    pub(crate) cache: Option<TrainingCache>
}

impl Network {
    /// Build network over the given weights. Topology is
    /// taken from the weights tensor.
    pub fn new(weights: Weights, activation: Activation) -> Self {
        let topology = weights.topology().clone();

        let activations = topology.layers().iter()
            .map(|nodes| vec![0.0; *nodes])
            .collect();

        Self {
            topology,
            activation,
            weights,
            activations,
            cache: None
        }
    }

    /// Allocate theta and psi caches needed for training.
    ///
    /// Fails if the topology has no hidden layers.
    pub fn with_training_cache(mut self) -> Result<Self> {
        self.allocate_training_cache()?;

        Ok(self)
    }

    /// Allocate training caches in place if they're missing.
    pub(crate) fn allocate_training_cache(&mut self) -> Result<()> {
        self.topology.ensure_trainable()?;

        if self.cache.is_none() {
            self.cache = Some(TrainingCache::new(&self.topology));
        }

        Ok(())
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn activation_function(&self) -> Activation {
        self.activation
    }

    #[inline]
    /// True when training caches are allocated.
    pub fn has_training_cache(&self) -> bool {
        self.cache.is_some()
    }

    #[inline]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    #[inline]
    /// Read-only view of the weights of connectivity layer `n`.
    pub fn weights_layer(&self, n: usize) -> WeightsLayer<'_> {
        self.weights.layer(n)
    }

    #[inline]
    /// Current outputs of the nodes of activation layer `alpha`.
    pub fn activation(&self, alpha: usize) -> &[f64] {
        &self.activations[alpha]
    }

    #[inline]
    /// Current outputs of the output layer.
    pub fn output(&self) -> &[f64] {
        &self.activations[self.topology.output_layer()]
    }

    #[inline]
    /// Add `delta` to the weight of the edge from node `k` of
    /// activation layer `n` to node `j` of layer `n + 1`.
    pub fn apply_weight_delta(&mut self, n: usize, k: usize, j: usize, delta: f64) {
        self.weights.add(n, k, j, delta);
    }

    /// Store the given values in the input activation layer.
    ///
    /// # Panics
    ///
    /// Panics if the input length differs from the input layer size.
    pub fn set_input(&mut self, input: &[f64]) {
        self.activations[0].copy_from_slice(input);
    }

    /// Weighted sum of the previous layer's outputs
    /// for node `j` of activation layer `alpha`.
    pub fn theta(&self, alpha: usize, j: usize) -> f64 {
        weighted_sum(&self.activations[alpha - 1], self.weights.layer(alpha - 1), j)
    }

    #[cfg(test)]
    pub(crate) fn psi(&self, alpha: usize) -> &[f64] {
        self.cache.as_ref()
            .map(|cache| cache.psi[alpha].as_slice())
            .unwrap_or_default()
    }
}

#[inline]
/// `Σ_k inputs[k] * W[k][j]`
pub(crate) fn weighted_sum(inputs: &[f64], layer: WeightsLayer<'_>, j: usize) -> f64 {
    let mut sum = 0.0;

    for (k, input) in inputs.iter().enumerate() {
        sum += input * layer.get(k, j);
    }

    sum
}

#[test]
fn test_network_state() -> anyhow::Result<()> {
    let topology = Topology::new([3, 4, 2])?;
    let weights = Weights::random(&topology, -1.0, 1.0, &mut fastrand::Rng::with_seed(1));

    let mut network = Network::new(weights.clone(), Activation::Sigmoid);

    assert!(!network.has_training_cache());
    assert_eq!(network.activation(0), &[0.0; 3]);
    assert_eq!(network.output().len(), 2);

    network.set_input(&[0.5, -0.5, 1.0]);

    assert_eq!(network.activation(0), &[0.5, -0.5, 1.0]);

    let expected = 0.5 * weights.get(0, 0, 3) - 0.5 * weights.get(0, 1, 3) + weights.get(0, 2, 3);

    assert!((network.theta(1, 3) - expected).abs() < 1e-15);

    network.apply_weight_delta(1, 3, 1, 0.25);

    assert_eq!(network.weights().get(1, 3, 1), weights.get(1, 3, 1) + 0.25);
    assert_eq!(network.weights_layer(1).get(3, 1), weights.get(1, 3, 1) + 0.25);

    Ok(())
}

#[test]
fn test_training_cache_allocation() -> anyhow::Result<()> {
    let topology = Topology::new([2, 3, 4, 1])?;
    let network = Network::new(Weights::zeros(&topology), Activation::Sigmoid).with_training_cache()?;

    let cache = network.cache.as_ref().expect("cache is allocated");

    let theta = cache.theta.iter().map(Vec::len).collect::<Vec<_>>();
    let psi = cache.psi.iter().map(Vec::len).collect::<Vec<_>>();

    assert_eq!(theta, [0, 3, 4, 0]);
    assert_eq!(psi, [0, 0, 4, 1]);

    let shallow = Topology::new([2, 1])?;

    assert!(Network::new(Weights::zeros(&shallow), Activation::Sigmoid).with_training_cache().is_err());

    Ok(())
}
