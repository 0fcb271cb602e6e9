use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Online gradient descent: weights are updated right after
/// every single case, with a fixed learn rate.
///
/// ```
/// use sheetnetlib::prelude::*;
///
/// let topology = Topology::new([2, 2, 1]).unwrap();
/// let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(3));
///
/// let mut network = Network::new(weights, Activation::Sigmoid)
///     .with_training_cache()
///     .unwrap();
///
/// let backpropagation = Backpropagation::default()
///     .with_learn_rate(0.5);
///
/// let before = network.run(&[1.0, 0.0])[0];
///
/// for _ in 0..100 {
///     backpropagation.train_case(&mut network, &[1.0, 0.0], &[1.0]);
/// }
///
/// assert!(network.run(&[1.0, 0.0])[0] > before);
/// ```
pub struct Backpropagation {
    /// Multiplier of the error gradient, lambda.
    pub learn_rate: f64
}

impl Default for Backpropagation {
    #[inline]
    fn default() -> Self {
        Self {
            learn_rate: 0.3
        }
    }
}

impl Backpropagation {
    #[inline]
    pub fn with_learn_rate(mut self, learn_rate: f64) -> Self {
        self.learn_rate = learn_rate;

        self
    }

    #[inline]
    /// Run the training pass on a case and update weights for it.
    pub fn train_case(&self, network: &mut Network, input: &[f64], expected: &[f64]) {
        network.run_training(input, expected);

        self.step(network);
    }

    /// Walk error signals back from the output layer and
    /// update every weight of the network in place.
    ///
    /// Must be called right after `Network::run_training`, which
    /// fills weighted sums and output layer error signals.
    ///
    /// Each edge's weight is read into the `omega` sum before it is
    /// updated, so all the deltas are the gradient at the weights
    /// the training pass used.
    pub fn step(&self, network: &mut Network) {
        let Network { topology, activation, weights, activations, cache } = network;

        let Some(cache) = cache.as_mut() else {
            tracing::warn!("backpropagation step without training pass, skipping");

            return;
        };

        let lambda = self.learn_rate;

        // alpha is the activation layer whose error signals are derived
        // from layer alpha + 1, while weights between them are updated.
        for alpha in (1..topology.output_layer()).rev() {
            for k in 0..topology.nodes(alpha) {
                let mut omega = 0.0;

                for j in 0..topology.nodes(alpha + 1) {
                    let psi = cache.psi[alpha + 1][j];

                    omega += psi * weights.get(alpha, k, j);

                    weights.add(alpha, k, j, lambda * activations[alpha][k] * psi);
                }

                let psi = omega * activation.derivative(cache.theta[alpha][k]);

                if alpha > 1 {
                    cache.psi[alpha][k] = psi;
                }

                // First hidden layer: nothing behind the input layer needs
                // an error signal, so the input edges are updated right away.
                else {
                    for m in 0..topology.input_size() {
                        weights.add(0, m, k, lambda * activations[0][m] * psi);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
/// Error of the network on a single case.
fn error_at(network: &Network, input: &[f64], expected: &[f64]) -> f64 {
    let mut network = network.clone();

    case_error(network.run(input), expected)
}

#[cfg(test)]
/// Compare weight deltas made by a single backpropagation step with
/// central finite difference estimates of `-lambda * dE/dw`.
fn gradient_check(layers: &[usize], activation: Activation, seed: u64) {
    const H: f64 = 1e-5;
    const LAMBDA: f64 = 1.0;

    let topology = Topology::new(layers).expect("valid topology");

    let mut rng = fastrand::Rng::with_seed(seed);

    let weights = Weights::random(&topology, -1.0, 1.0, &mut rng);

    let input = (0..topology.input_size())
        .map(|_| rng.f64() * 2.0 - 1.0)
        .collect::<Vec<_>>();

    let expected = (0..topology.output_size())
        .map(|_| rng.f64())
        .collect::<Vec<_>>();

    let network = Network::new(weights, activation)
        .with_training_cache()
        .expect("topology has hidden layers");

    let mut trained = network.clone();

    Backpropagation::default()
        .with_learn_rate(LAMBDA)
        .train_case(&mut trained, &input, &expected);

    for n in 0..topology.connectivity_layers() {
        let (rows, cols) = topology.layer_shape(n);

        for k in 0..rows {
            for j in 0..cols {
                let delta = trained.weights().get(n, k, j) - network.weights().get(n, k, j);

                let mut plus = network.clone();
                let mut minus = network.clone();

                plus.apply_weight_delta(n, k, j, H);
                minus.apply_weight_delta(n, k, j, -H);

                let gradient = (error_at(&plus, &input, &expected) - error_at(&minus, &input, &expected)) / (2.0 * H);

                assert!(
                    (delta + LAMBDA * gradient).abs() < 1e-6,
                    "{activation} {topology}: w[{n}][{k}][{j}] delta = {delta}, expected {}",
                    -LAMBDA * gradient
                );
            }
        }
    }
}

#[test]
fn test_gradient_check_one_hidden_layer() {
    gradient_check(&[2, 3, 2], Activation::Sigmoid, 1);
    gradient_check(&[2, 3, 2], Activation::Tangent, 2);
}

#[test]
fn test_gradient_check_deep() {
    gradient_check(&[3, 4, 3, 2], Activation::Sigmoid, 3);
    gradient_check(&[3, 4, 3, 2], Activation::Tangent, 4);
    gradient_check(&[2, 3, 4, 3, 1], Activation::Sigmoid, 5);
    gradient_check(&[2, 3, 4, 3, 1], Activation::Tangent, 6);
}

#[test]
fn test_step_without_training_pass() -> anyhow::Result<()> {
    let topology = Topology::new([2, 2, 1])?;
    let weights = Weights::random(&topology, -1.0, 1.0, &mut fastrand::Rng::with_seed(9));

    let mut network = Network::new(weights.clone(), Activation::Sigmoid);

    Backpropagation::default().step(&mut network);

    assert_eq!(network.weights(), &weights);

    Ok(())
}

#[test]
fn test_online_updates_reduce_error() -> anyhow::Result<()> {
    let topology = Topology::new([2, 4, 3, 2])?;
    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(11));

    let mut network = Network::new(weights, Activation::Sigmoid).with_training_cache()?;

    let cases = [
        ([0.0, 0.0], [0.0, 1.0]),
        ([0.0, 1.0], [1.0, 0.0]),
        ([1.0, 0.0], [1.0, 0.0]),
        ([1.0, 1.0], [0.0, 1.0])
    ];

    let total_error = |network: &Network| -> f64 {
        cases.iter()
            .map(|(input, expected)| error_at(network, input, expected))
            .sum()
    };

    let before = total_error(&network);

    let backpropagation = Backpropagation::default();

    for _ in 0..2000 {
        for (input, expected) in &cases {
            backpropagation.train_case(&mut network, input, expected);
        }
    }

    assert!(total_error(&network) < before);

    Ok(())
}
