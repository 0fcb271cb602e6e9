use crate::prelude::*;

use super::network::weighted_sum;

impl Network {
    /// Recalculate all the layers from the stored input
    /// (perform forward propagation).
    ///
    /// Nothing but the activation values is changed.
    pub fn propagate(&mut self) {
        for alpha in 1..self.topology.activation_layers() {
            let (previous, next) = self.activations.split_at_mut(alpha);

            let inputs = &previous[alpha - 1];
            let layer = self.weights.layer(alpha - 1);

            for (j, output) in next[0].iter_mut().enumerate() {
                *output = self.activation.evaluate(weighted_sum(inputs, layer, j));
            }
        }
    }

    /// Store the input and run the network on it.
    ///
    /// Return outputs of the output layer.
    pub fn run(&mut self, input: &[f64]) -> &[f64] {
        self.set_input(input);
        self.propagate();

        self.output()
    }

    /// Run the network on the given input like `run` does, but also
    /// remember hidden layers' weighted sums and compute error signals
    /// of the output layer against the expected output.
    ///
    /// Backpropagation step must follow this call.
    ///
    /// Without training cache (see `Network::with_training_cache`)
    /// this is the same as `run`.
    pub fn run_training(&mut self, input: &[f64], expected: &[f64]) {
        self.set_input(input);

        if self.cache.is_none() {
            tracing::warn!(topology = %self.topology, "training pass without training cache, running instead");

            self.propagate();

            return;
        }

        let Self { topology, activation, weights, activations, cache } = self;

        let Some(cache) = cache.as_mut() else {
            return;
        };

        let output = topology.output_layer();

        for alpha in 1..output {
            let (previous, next) = activations.split_at_mut(alpha);

            let inputs = &previous[alpha - 1];
            let layer = weights.layer(alpha - 1);

            for (j, node) in next[0].iter_mut().enumerate() {
                let theta = weighted_sum(inputs, layer, j);

                cache.theta[alpha][j] = theta;

                *node = activation.evaluate(theta);
            }
        }

        let (previous, next) = activations.split_at_mut(output);

        let inputs = &previous[output - 1];
        let layer = weights.layer(output - 1);

        for (i, node) in next[0].iter_mut().enumerate() {
            let theta = weighted_sum(inputs, layer, i);

            *node = activation.evaluate(theta);

            cache.psi[output][i] = (expected[i] - *node) * activation.derivative(theta);
        }
    }
}

#[cfg(test)]
fn xor_network(activation: Activation) -> Network {
    let topology = Topology::new([2, 3, 1]).expect("valid topology");
    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(42));

    Network::new(weights, activation)
}

#[test]
fn test_forward_shape_and_determinism() {
    for activation in Activation::ALL {
        let mut network = xor_network(activation);

        let first = network.run(&[1.0, 0.0]).to_vec();

        assert_eq!(first.len(), network.topology().output_size());

        // Other inputs in between don't leak into the next run.
        network.run(&[0.3, 0.9]);

        let second = network.run(&[1.0, 0.0]).to_vec();

        assert_eq!(first, second);
    }
}

#[test]
fn test_forward_known_values() -> anyhow::Result<()> {
    let topology = Topology::new([2, 2, 1])?;

    let weights = Weights::from_values(&topology, [
        1.0, -1.0,
        0.5,  2.0,

        1.0,
        1.0
    ])?;

    let mut network = Network::new(weights.clone(), Activation::Linear);

    // h0 = 1 * 1 + 2 * 0.5 = 2, h1 = 1 * -1 + 2 * 2 = 3
    assert_eq!(network.run(&[1.0, 2.0]), &[5.0]);
    assert_eq!(network.activation(1), &[2.0, 3.0]);

    let mut network = Network::new(weights, Activation::Sigmoid);

    let h0 = sigmoid(2.0);
    let h1 = sigmoid(3.0);

    assert_eq!(network.run(&[1.0, 2.0]), &[sigmoid(h0 + h1)]);

    Ok(())
}

#[test]
fn test_training_pass_matches_run() -> anyhow::Result<()> {
    let mut network = xor_network(Activation::Tangent).with_training_cache()?;

    let output = network.run(&[0.0, 1.0])[0];

    network.run_training(&[0.0, 1.0], &[1.0]);

    assert_eq!(network.output(), &[output]);

    let theta = network.theta(2, 0);

    assert_eq!(network.psi(2), &[(1.0 - output) * tanh_derivative(theta)]);

    Ok(())
}

#[test]
fn test_training_pass_on_shallow_network() -> anyhow::Result<()> {
    let topology = Topology::new([2, 1])?;
    let weights = Weights::from_values(&topology, [0.5, -0.25])?;

    let mut network = Network::new(weights.clone(), Activation::Linear);

    assert!(network.clone().with_training_cache().is_err());

    // Nothing is cached or trained, the pass only runs the network.
    Backpropagation::default().train_case(&mut network, &[1.0, 2.0], &[1.0]);

    assert!(!network.has_training_cache());
    assert_eq!(network.weights(), &weights);
    assert_eq!(network.output(), &[0.0]);

    Ok(())
}
