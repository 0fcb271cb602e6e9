use std::fmt;

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Every edge weight of the network stored in one flat array.
///
/// Values are ordered layer-major, then by source node `k`, then
/// by destination node `j`, which is also the order of the weights
/// file. `offsets[n]` is the index of `W[n][0][0]`.
pub struct Weights {
    topology: Topology,
    offsets: Vec<usize>,
    values: Vec<f64>
}

impl Weights {
    /// Build weights tensor for the topology with all weights set to 0.
    pub fn zeros(topology: &Topology) -> Self {
        let mut offsets = Vec::with_capacity(topology.connectivity_layers());
        let mut offset = 0;

        for n in 0..topology.connectivity_layers() {
            let (rows, cols) = topology.layer_shape(n);

            offsets.push(offset);
            offset += rows * cols;
        }

        Self {
            topology: topology.clone(),
            offsets,
            values: vec![0.0; offset]
        }
    }

    /// Build weights tensor from flat values in the weights file order.
    pub fn from_values(topology: &Topology, values: impl Into<Vec<f64>>) -> Result<Self> {
        let values = values.into();
        let mut weights = Self::zeros(topology);

        if values.len() != weights.values.len() {
            return Err(Error::InvalidWeights {
                expected: weights.values.len(),
                actual: values.len()
            });
        }

        weights.values = values;

        Ok(weights)
    }

    /// Fill every weight with an independent uniform
    /// random value from `[min, max)`.
    pub fn random(topology: &Topology, min: f64, max: f64, rng: &mut fastrand::Rng) -> Self {
        let mut weights = Self::zeros(topology);
        let range = max - min;

        for weight in &mut weights.values {
            *weight = rng.f64() * range + min;
        }

        weights
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    /// All weights in the weights file order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    /// Read-only view of connectivity layer `n`.
    pub fn layer(&self, n: usize) -> WeightsLayer<'_> {
        let (rows, cols) = self.topology.layer_shape(n);
        let offset = self.offsets[n];

        WeightsLayer {
            n,
            rows,
            cols,
            values: &self.values[offset..offset + rows * cols]
        }
    }

    #[inline]
    fn index(&self, n: usize, k: usize, j: usize) -> usize {
        let (rows, cols) = self.topology.layer_shape(n);

        debug_assert!(k < rows && j < cols, "edge w[{n}][{k}][{j}] is out of {rows}x{cols} layer");

        self.offsets[n] + k * cols + j
    }

    #[inline]
    /// Weight of the edge from node `k` of activation layer `n`
    /// to node `j` of activation layer `n + 1`.
    pub fn get(&self, n: usize, k: usize, j: usize) -> f64 {
        self.values[self.index(n, k, j)]
    }

    #[inline]
    pub fn add(&mut self, n: usize, k: usize, j: usize, delta: f64) {
        let index = self.index(n, k, j);

        self.values[index] += delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Weight matrix of a single connectivity layer, `rows` source
/// nodes by `cols` destination nodes.
pub struct WeightsLayer<'a> {
    n: usize,
    rows: usize,
    cols: usize,
    values: &'a [f64]
}

impl<'a> WeightsLayer<'a> {
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, k: usize, j: usize) -> f64 {
        self.values[k * self.cols + j]
    }

    #[inline]
    /// Weights of all the edges leaving source node `k`.
    pub fn row(&self, k: usize) -> &'a [f64] {
        &self.values[k * self.cols..(k + 1) * self.cols]
    }

    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &'a [f64]> {
        self.values.chunks(self.cols)
    }
}

const DIVIDER: &str = "----------------------------------------------------------------------";

impl fmt::Display for WeightsLayer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, row) in self.rows().enumerate() {
            write!(f, "| ")?;

            for (j, weight) in row.iter().enumerate() {
                write!(f, "w{}{k}{j}: {weight} | ", self.n + 1)?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in 0..self.topology.connectivity_layers() {
            writeln!(f, "{DIVIDER}")?;
            write!(f, "{}", self.layer(n))?;
        }

        writeln!(f, "{DIVIDER}")
    }
}

#[test]
fn test_weights_layout() -> anyhow::Result<()> {
    let topology = Topology::new([2, 3, 1])?;

    let weights = Weights::from_values(&topology, [
        // w[0]: 2x3
        0.1, 0.2, 0.3,
        0.4, 0.5, 0.6,

        // w[1]: 3x1
        0.7,
        0.8,
        0.9
    ])?;

    assert_eq!(weights.get(0, 1, 2), 0.6);
    assert_eq!(weights.get(1, 2, 0), 0.9);

    let layer = weights.layer(0);

    assert_eq!(layer.shape(), (2, 3));
    assert_eq!(layer.get(1, 0), 0.4);
    assert_eq!(layer.row(0), &[0.1, 0.2, 0.3]);
    assert_eq!(layer.rows().count(), 2);

    assert_eq!(weights.layer(1).row(1), &[0.8]);

    assert!(matches!(
        Weights::from_values(&topology, [0.0; 8]),
        Err(Error::InvalidWeights { expected: 9, actual: 8 })
    ));

    let dump = weights.to_string();

    assert!(dump.contains("w112: 0.6"));
    assert!(dump.contains("w220: 0.9"));

    Ok(())
}

#[test]
fn test_random_weights_range() -> anyhow::Result<()> {
    let topology = Topology::new([4, 6, 6, 3])?;

    let weights = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(7));
    let again = Weights::random(&topology, -1.5, 1.5, &mut fastrand::Rng::with_seed(7));

    assert_eq!(weights.as_slice().len(), topology.weights_count());
    assert!(weights.as_slice().iter().all(|w| (-1.5..1.5).contains(w)));

    // Same seed gives the same weights.
    assert_eq!(weights, again);

    Ok(())
}
