use rand::Rng;

use crate::{activation::activation::Activation, error::Result, math::matrix::Matrix};

/// One fully-connected layer: `weights` is `(fan_out × fan_in)`, `biases` is
/// `(fan_out × 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    pub(crate) weights: Matrix,
    pub(crate) biases: Matrix,
}

/// A parameter change for one layer, handed to
/// [`Mlp::apply_update`](crate::network::mlp::Mlp::apply_update).
///
/// Applied as `W = W * weight_scale - weights_delta` and
/// `b = b - biases_delta`. The deltas are already multiplied by the learning
/// rate.
#[derive(Debug, Clone)]
pub struct LayerUpdate {
    /// Multiplicative shrink applied to the weights before the delta.
    /// `None` leaves them as they are.
    pub weight_scale: Option<f64>,
    pub weights_delta: Matrix,
    pub biases_delta: Matrix,
}

impl Dense {
    /// Scaled uniform init: entries in [-1, 1) times `2 / sqrt(fan_in)`,
    /// biases zero.
    pub fn new<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Dense {
        let scale = 2.0 / (fan_in as f64).sqrt();
        Dense {
            weights: Matrix::random(fan_out, fan_in, rng).scale(scale),
            biases: Matrix::zeros(fan_out, 1),
        }
    }

    pub fn fan_in(&self) -> usize {
        self.weights.cols()
    }

    pub fn fan_out(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    /// Returns `(z, a)` for the column `input`: `z = W·input + b`, `a = f(z)`.
    pub fn feed(&self, input: &Matrix, activation: Activation) -> Result<(Matrix, Matrix)> {
        let z = self.weights.dot(input)?.add(&self.biases)?;
        let a = activation.apply(&z);
        Ok((z, a))
    }

    /// Gradients for this layer given its error signal `delta` and the
    /// activation that fed it. Returns `(dW, db)`.
    pub fn compute_gradients(&self, delta: &Matrix, input: &Matrix) -> Result<(Matrix, Matrix)> {
        let weights_grad = delta.dot(&input.transpose())?;
        Ok((weights_grad, delta.clone()))
    }

    /// Error signal for the previous layer, before its activation derivative:
    /// `Wᵀ · delta`.
    pub fn propagate(&self, delta: &Matrix) -> Result<Matrix> {
        self.weights.transpose().dot(delta)
    }

    pub(crate) fn apply_update(&mut self, update: &LayerUpdate) -> Result<()> {
        let weights = match update.weight_scale {
            Some(factor) => self.weights.scale(factor),
            None => self.weights.clone(),
        };
        let weights = weights.sub(&update.weights_delta)?;
        let biases = self.biases.sub(&update.biases_delta)?;
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }
}
