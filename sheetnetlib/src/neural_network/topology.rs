use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sizes of the network's activation layers, from the input
/// layer (index 0) to the output layer.
///
/// A topology with `L + 1` activation layers has `L` connectivity
/// layers, one weight matrix between every two neighbours.
/// Immutable once built.
pub struct Topology {
    layers: Vec<usize>
}

impl Topology {
    /// Validate layer sizes and build a topology.
    pub fn new(layers: impl Into<Vec<usize>>) -> Result<Self> {
        let layers = layers.into();

        if layers.len() < 2 {
            return Err(Error::InvalidTopology(format!(
                "need at least input and output layers, got {} layer(s)",
                layers.len()
            )));
        }

        if let Some(alpha) = layers.iter().position(|nodes| *nodes == 0) {
            return Err(Error::InvalidTopology(format!("activation layer {alpha} has no nodes")));
        }

        Ok(Self {
            layers
        })
    }

    #[inline]
    /// Sizes of all the activation layers.
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[inline]
    /// Amount of nodes in the given activation layer.
    pub fn nodes(&self, alpha: usize) -> usize {
        self.layers[alpha]
    }

    #[inline]
    pub fn activation_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn connectivity_layers(&self) -> usize {
        self.layers.len() - 1
    }

    #[inline]
    /// Index of the output activation layer.
    pub fn output_layer(&self) -> usize {
        self.layers.len() - 1
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.layers[0]
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.layers[self.output_layer()]
    }

    #[inline]
    /// Shape of the weight matrix of connectivity layer `n`.
    pub fn layer_shape(&self, n: usize) -> (usize, usize) {
        (self.layers[n], self.layers[n + 1])
    }

    /// Total amount of edges (weights) in the network.
    pub fn weights_count(&self) -> usize {
        self.layers.windows(2)
            .map(|pair| pair[0] * pair[1])
            .sum()
    }

    /// Training walks back through at least one hidden layer,
    /// so it needs input, hidden and output layers.
    pub fn is_trainable(&self) -> bool {
        self.layers.len() >= 3
    }

    pub(crate) fn ensure_trainable(&self) -> Result<()> {
        if !self.is_trainable() {
            return Err(Error::InvalidTopology(format!(
                "training needs at least one hidden layer, got {self}"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers = self.layers.iter()
            .map(|nodes| nodes.to_string())
            .collect::<Vec<_>>();

        f.write_str(&layers.join("-"))
    }
}

impl FromStr for Topology {
    type Err = Error;

    /// Parse topology in `2-5-1` format.
    fn from_str(s: &str) -> Result<Self> {
        let layers = s.split('-')
            .map(|nodes| {
                nodes.trim().parse::<usize>().map_err(|err| {
                    Error::InvalidTopology(format!("{nodes:?} is not a layer size: {err}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(layers)
    }
}

#[test]
fn test_topology() -> anyhow::Result<()> {
    let topology = Topology::new([2, 5, 3, 1])?;

    assert_eq!(topology.activation_layers(), 4);
    assert_eq!(topology.connectivity_layers(), 3);
    assert_eq!(topology.output_layer(), 3);
    assert_eq!(topology.input_size(), 2);
    assert_eq!(topology.output_size(), 1);
    assert_eq!(topology.layer_shape(1), (5, 3));
    assert_eq!(topology.weights_count(), 2 * 5 + 5 * 3 + 3);
    assert!(topology.is_trainable());

    assert_eq!(topology.to_string(), "2-5-3-1");
    assert_eq!("2-5-3-1".parse::<Topology>()?, topology);

    Ok(())
}

#[test]
fn test_invalid_topology() {
    assert!(Topology::new([3]).is_err());
    assert!(Topology::new(Vec::<usize>::new()).is_err());
    assert!(Topology::new([2, 0, 1]).is_err());
    assert!("2-x-1".parse::<Topology>().is_err());

    let shallow = Topology::new([2, 1]).expect("two layers are a valid topology");

    assert!(!shallow.is_trainable());
    assert!(shallow.ensure_trainable().is_err());
}
