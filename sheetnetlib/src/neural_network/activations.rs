use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

#[inline]
/// `1 / (1 + e^-x)`
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[inline]
/// `f(x) * (1 - f(x))`
pub fn sigmoid_derivative(x: f64) -> f64 {
    let y = sigmoid(x);

    y * (1.0 - y)
}

#[inline]
pub fn linear(x: f64) -> f64 {
    x
}

#[inline]
/// Constant `1`. Correct for `f(x) = x` but gives no useful
/// gradient, so linear networks are only good for running.
pub fn linear_derivative(_: f64) -> f64 {
    1.0
}

#[inline]
/// Hyperbolic tangent computed from `e^(-2|x|)` so that large
/// inputs never overflow the exponent.
pub fn tanh(x: f64) -> f64 {
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let pow = (-2.0 * sign * x).exp();

    sign * (1.0 - pow) / (1.0 + pow)
}

#[inline]
/// `1 - f(x)^2`
pub fn tanh_derivative(x: f64) -> f64 {
    let y = tanh(x);

    1.0 - y * y
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Activation function applied to every hidden and output node.
///
/// Resolved once from its configuration name. Unknown names
/// resolve to `Sigmoid`.
pub enum Activation {
    #[default]
    Sigmoid,
    Linear,
    Tangent
}

impl Activation {
    pub const ALL: [Self; 3] = [Self::Sigmoid, Self::Linear, Self::Tangent];

    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => sigmoid(x),
            Self::Linear  => linear(x),
            Self::Tangent => tanh(x)
        }
    }

    #[inline]
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => sigmoid_derivative(x),
            Self::Linear  => linear_derivative(x),
            Self::Tangent => tanh_derivative(x)
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sigmoid => "sigmoid",
            Self::Linear  => "linear",
            Self::Tangent => "tangent"
        }
    }

    /// Find activation function by its name, ignoring case.
    ///
    /// Return `None` if the name is unknown.
    pub fn lookup(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();

        Self::ALL.into_iter()
            .find(|activation| activation.name().eq_ignore_ascii_case(name))
    }

    /// Resolve activation function by its name, falling back
    /// to `Sigmoid` for unknown names.
    pub fn from_name(name: impl AsRef<str>) -> Self {
        Self::lookup(name.as_ref()).unwrap_or_else(|| {
            tracing::warn!(name = name.as_ref(), "unknown activation function, using sigmoid");

            Self::Sigmoid
        })
    }
}

impl FromStr for Activation {
    type Err = std::convert::Infallible;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for Activation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
const SPREAD: [f64; 13] = [-50.0, -20.0, -5.0, -1.0, -0.5, -1e-3, 0.0, 1e-3, 0.5, 1.0, 5.0, 20.0, 50.0];

#[test]
fn test_sigmoid_identity() {
    for x in SPREAD {
        let y = Activation::Sigmoid.evaluate(x);

        assert!(y.is_finite());
        assert!((0.0..=1.0).contains(&y));
        assert_eq!(Activation::Sigmoid.derivative(x), y * (1.0 - y));
    }

    assert_eq!(sigmoid(0.0), 0.5);
}

#[test]
fn test_tangent_identity() {
    for x in SPREAD {
        let y = Activation::Tangent.evaluate(x);

        assert!(y.is_finite());
        assert!((-1.0..=1.0).contains(&y));
        assert_eq!(Activation::Tangent.derivative(x), 1.0 - y * y);

        // Odd function, matches the std implementation.
        assert_eq!(tanh(-x), -tanh(x));
        assert!((y - x.tanh()).abs() < 1e-12);
    }

    assert_eq!(tanh(50.0), 1.0);
    assert_eq!(tanh(-50.0), -1.0);
    assert_eq!(tanh(1000.0), 1.0);
}

#[test]
fn test_linear_stub_derivative() {
    for x in SPREAD {
        assert_eq!(Activation::Linear.evaluate(x), x);
        assert_eq!(Activation::Linear.derivative(x), 1.0);
    }
}

#[test]
fn test_activation_names() {
    for activation in Activation::ALL {
        assert_eq!(Activation::from_name(activation.name()), activation);
        assert_eq!(activation.to_string(), activation.name());
    }

    assert_eq!(Activation::from_name("TANGENT"), Activation::Tangent);
    assert_eq!(Activation::lookup("relu"), None);
    assert_eq!(Activation::from_name("relu"), Activation::Sigmoid);
    assert_eq!(Activation::from_name(""), Activation::Sigmoid);
    assert_eq!("linear".parse::<Activation>(), Ok(Activation::Linear));
}
