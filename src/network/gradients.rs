use serde::Serialize;

use crate::math::matrix::Matrix;

/// Shape signature of a model's parameters, one entry per layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamShapes {
    pub weights: Vec<(usize, usize)>,
    pub biases: Vec<(usize, usize)>,
}

impl ParamShapes {
    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }
}

/// Per-layer gradients produced by one backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub d_weights: Vec<Matrix>,
    pub d_biases: Vec<Matrix>,
}

impl Gradients {
    pub fn zeros(shapes: &ParamShapes) -> Gradients {
        Gradients {
            d_weights: shapes.weights.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect(),
            d_biases: shapes.biases.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect(),
        }
    }

    pub fn num_layers(&self) -> usize {
        self.d_weights.len()
    }

    pub fn shapes(&self) -> ParamShapes {
        ParamShapes {
            weights: self.d_weights.iter().map(Matrix::shape).collect(),
            biases: self.d_biases.iter().map(Matrix::shape).collect(),
        }
    }

    /// L2 norm over every weight and bias gradient taken as one flat vector.
    pub fn global_norm(&self) -> f64 {
        self.d_weights
            .iter()
            .chain(&self.d_biases)
            .map(Matrix::sum_squares)
            .sum::<f64>()
            .sqrt()
    }

    /// Every tensor multiplied by the same `factor`.
    pub fn scale(&self, factor: f64) -> Gradients {
        Gradients {
            d_weights: self.d_weights.iter().map(|g| g.scale(factor)).collect(),
            d_biases: self.d_biases.iter().map(|g| g.scale(factor)).collect(),
        }
    }
}
