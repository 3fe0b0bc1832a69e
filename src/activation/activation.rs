use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::math::matrix::Matrix;

/// Negative-side slope of `LeakyRelu`.
pub const LEAKY_RELU_ALPHA: f64 = 0.01;
/// Saturation scale of `Elu`.
pub const ELU_ALPHA: f64 = 1.0;

const GELU_COEFF: f64 = 0.044715;

/// The nonlinearities a playground model can use.
///
/// One activation is chosen per model and applied to the pre-activation of
/// every layer, the output layer included. Names are resolved once, when the
/// model is built; see [`Activation::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    LeakyRelu,
    Elu,
    Gelu,
    Swish,
    Tanh,
    Sigmoid,
    Softsign,
    Linear,
}

impl Activation {
    pub const ALL: [Activation; 9] = [
        Activation::Relu,
        Activation::LeakyRelu,
        Activation::Elu,
        Activation::Gelu,
        Activation::Swish,
        Activation::Tanh,
        Activation::Sigmoid,
        Activation::Softsign,
        Activation::Linear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::LeakyRelu => "leaky_relu",
            Activation::Elu => "elu",
            Activation::Gelu => "gelu",
            Activation::Swish => "swish",
            Activation::Tanh => "tanh",
            Activation::Sigmoid => "sigmoid",
            Activation::Softsign => "softsign",
            Activation::Linear => "linear",
        }
    }

    /// Element-wise activation value.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Relu => if x > 0.0 { x } else { 0.0 },
            Activation::LeakyRelu => if x > 0.0 { x } else { LEAKY_RELU_ALPHA * x },
            Activation::Elu => {
                if x >= 0.0 { x } else { ELU_ALPHA * (x.exp() - 1.0) }
            }
            Activation::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + GELU_COEFF * x.powi(3))).tanh())
            }
            Activation::Swish => x * sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => sigmoid(x),
            Activation::Softsign => x / (1.0 + x.abs()),
            Activation::Linear => x,
        }
    }

    /// Element-wise derivative, evaluated at the pre-activation `x`.
    ///
    /// `Tanh` and `Sigmoid` first compute their own output and express the
    /// derivative through it (`1 - t²`, `s(1 - s)`).
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Relu => if x > 0.0 { 1.0 } else { 0.0 },
            Activation::LeakyRelu => if x > 0.0 { 1.0 } else { LEAKY_RELU_ALPHA },
            Activation::Elu => {
                if x >= 0.0 { 1.0 } else { ELU_ALPHA * x.exp() }
            }
            Activation::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                let t = (c * (x + GELU_COEFF * x.powi(3))).tanh();
                let sech2 = 1.0 - t * t;
                let d_inner = c * (1.0 + 3.0 * GELU_COEFF * x * x);
                0.5 * (1.0 + t) + 0.5 * x * sech2 * d_inner
            }
            Activation::Swish => {
                let s = sigmoid(x);
                s + x * s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = self.function(x);
                1.0 - t * t
            }
            Activation::Sigmoid => {
                let s = self.function(x);
                s * (1.0 - s)
            }
            Activation::Softsign => {
                let d = 1.0 + x.abs();
                1.0 / (d * d)
            }
            Activation::Linear => 1.0,
        }
    }

    /// Applies [`function`](Self::function) to every element of `z`.
    pub fn apply(&self, z: &Matrix) -> Matrix {
        match self {
            Activation::Linear => z.clone(),
            _ => z.map(|x| self.function(x)),
        }
    }

    /// Applies [`derivative`](Self::derivative) to every element of `z`.
    pub fn apply_derivative(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.derivative(x))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim();
        Activation::ALL
            .iter()
            .copied()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| Error::InvalidActivation(wanted.to_owned()))
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
