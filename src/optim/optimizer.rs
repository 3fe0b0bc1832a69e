//! Gradient-descent optimizer with EMA momentum, L2 penalty, decoupled weight
//! decay and global gradient-norm clipping.
//!
//! The optimizer never writes parameters itself: it turns gradients into one
//! [`LayerUpdate`] per layer and hands them to [`Mlp::apply_update`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layers::dense::LayerUpdate;
use crate::math::matrix::Matrix;
use crate::network::gradients::{Gradients, ParamShapes};
use crate::network::mlp::Mlp;

/// Guards the clipping scale against a zero norm.
pub const CLIP_EPSILON: f64 = 1e-12;

/// Optimizer hyperparameters. A coefficient of zero disables its feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub learning_rate: f64,
    /// EMA coefficient in [0, 1).
    pub momentum: f64,
    /// Penalty added to weight gradients as `l2 · W`.
    pub l2: f64,
    /// Decoupled shrink of the weights by `1 - lr · weight_decay` each step.
    pub weight_decay: f64,
    /// Global gradient-norm threshold; 0 turns clipping off.
    pub clip_norm: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            learning_rate: 0.01,
            momentum: 0.0,
            l2: 0.0,
            weight_decay: 0.0,
            clip_norm: 0.0,
        }
    }
}

impl OptimizerConfig {
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        OptimizerConfig { learning_rate, ..OptimizerConfig::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && (0.0..1.0).contains(&self.momentum)) {
            return Err(Error::InvalidConfig(format!(
                "momentum must be finite and in [0,1), got {}",
                self.momentum
            )));
        }
        for (name, value) in [
            ("l2", self.l2),
            ("weight decay", self.weight_decay),
            ("clip norm", self.clip_norm),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Optimizer state bound to one model shape.
///
/// Momentum buffers are allocated when the optimizer is created, so the model
/// it will update must be known up front. Applying it to a model of any other
/// shape fails with [`Error::ShapeMismatch`].
#[derive(Debug, Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
    shapes: ParamShapes,
    v_weights: Vec<Matrix>,
    v_biases: Vec<Matrix>,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig, model: &Mlp) -> Result<Optimizer> {
        config.validate()?;
        let shapes = model.param_shapes();
        let zeros = Gradients::zeros(&shapes);
        Ok(Optimizer {
            config,
            shapes,
            v_weights: zeros.d_weights,
            v_biases: zeros.d_biases,
        })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn shapes(&self) -> &ParamShapes {
        &self.shapes
    }

    /// Momentum buffers `(v_weights, v_biases)`.
    pub fn velocity(&self) -> (&[Matrix], &[Matrix]) {
        (&self.v_weights, &self.v_biases)
    }

    /// Updates `model` in place from `grads`.
    ///
    /// Order: clip globally, then per layer add the L2 term, fold into the
    /// momentum average, shrink the weights, and subtract `lr` times the
    /// effective gradient.
    pub fn apply(&mut self, model: &mut Mlp, grads: &Gradients) -> Result<()> {
        let model_shapes = model.param_shapes();
        if model_shapes != self.shapes {
            return Err(Error::ShapeMismatch {
                op: "optimizer",
                left: (self.shapes.num_layers(), 1),
                right: (model_shapes.num_layers(), 1),
            });
        }
        if grads.shapes() != self.shapes {
            return Err(Error::ShapeMismatch {
                op: "optimizer gradients",
                left: (self.shapes.num_layers(), 1),
                right: (grads.num_layers(), 1),
            });
        }

        let clipped;
        let grads = match clip_gradients(grads, self.config.clip_norm) {
            Some(scaled) => {
                clipped = scaled;
                &clipped
            }
            None => grads,
        };

        let lr = self.config.learning_rate;
        let mu = self.config.momentum;

        for l in 0..self.shapes.num_layers() {
            let mut g_w = grads.d_weights[l].clone();
            let mut g_b = grads.d_biases[l].clone();

            if self.config.l2 != 0.0 {
                g_w = g_w.add(&model.weights(l).scale(self.config.l2))?;
            }

            if mu != 0.0 {
                self.v_weights[l] = self.v_weights[l].scale(mu).add(&g_w.scale(1.0 - mu))?;
                self.v_biases[l] = self.v_biases[l].scale(mu).add(&g_b.scale(1.0 - mu))?;
                g_w = self.v_weights[l].clone();
                g_b = self.v_biases[l].clone();
            }

            let weight_scale = if self.config.weight_decay != 0.0 {
                Some(1.0 - lr * self.config.weight_decay)
            } else {
                None
            };

            model.apply_update(
                l,
                &LayerUpdate {
                    weight_scale,
                    weights_delta: g_w.scale(lr),
                    biases_delta: g_b.scale(lr),
                },
            )?;
        }
        Ok(())
    }
}

/// Rescales every gradient tensor by one shared factor so the global norm is
/// at most `threshold`. Returns `None` when clipping is off or not needed.
pub fn clip_gradients(grads: &Gradients, threshold: f64) -> Option<Gradients> {
    if threshold <= 0.0 {
        return None;
    }
    let norm = grads.global_norm();
    if norm <= threshold {
        return None;
    }
    debug!("clipping gradient norm {norm:.4} to {threshold}");
    Some(grads.scale(threshold / (norm + CLIP_EPSILON)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::activation::activation::Activation;

    fn model() -> Mlp {
        Mlp::with_seed(&[2, 3, 1], Activation::Tanh, 42).unwrap()
    }

    fn some_gradients(model: &Mlp) -> Gradients {
        let (_, cache) = model.forward_training(&[0.4, -0.9]).unwrap();
        model.backward(&[1.0], &cache).unwrap()
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        assert!(OptimizerConfig::default().validate().is_ok());
        assert!(OptimizerConfig::with_learning_rate(0.0).validate().is_err());
        assert!(OptimizerConfig { momentum: 1.0, ..Default::default() }.validate().is_err());
        assert!(OptimizerConfig { l2: -0.1, ..Default::default() }.validate().is_err());
        assert!(OptimizerConfig { clip_norm: f64::NAN, ..Default::default() }
            .validate()
            .is_err());
    }

    #[test]
    fn plain_config_matches_model_step() {
        let mut a = model();
        let mut b = a.clone();
        let grads = some_gradients(&a);

        let mut opt = Optimizer::new(OptimizerConfig::with_learning_rate(0.05), &a).unwrap();
        opt.apply(&mut a, &grads).unwrap();
        b.step(&grads, 0.05).unwrap();

        assert_eq!(a.layers(), b.layers());
    }

    #[test]
    fn clipping_uses_one_global_factor() {
        let shapes = model().param_shapes();
        let mut grads = Gradients::zeros(&shapes);
        // 6² + 8² = 100 -> norm 10
        grads.d_weights[0].as_mut_slice()[0] = 6.0;
        grads.d_biases[1].as_mut_slice()[0] = 8.0;
        assert!((grads.global_norm() - 10.0).abs() < 1e-12);

        let clipped = clip_gradients(&grads, 2.0).unwrap();
        assert!((clipped.global_norm() - 2.0).abs() < 1e-9);
        assert!((clipped.d_weights[0].as_slice()[0] - 1.2).abs() < 1e-9);
        assert!((clipped.d_biases[1].as_slice()[0] - 1.6).abs() < 1e-9);

        assert!(clip_gradients(&grads, 0.0).is_none());
        assert!(clip_gradients(&grads, 10.5).is_none());
    }

    #[test]
    fn weight_decay_alone_shrinks_weights_only() {
        let mut m = model();
        let before = m.clone();
        let grads = Gradients::zeros(&m.param_shapes());
        let config = OptimizerConfig { learning_rate: 0.5, weight_decay: 0.1, ..Default::default() };
        let mut opt = Optimizer::new(config, &m).unwrap();

        opt.apply(&mut m, &grads).unwrap();

        let factor = 1.0 - 0.5 * 0.1;
        for l in 0..m.num_layers() {
            for (after, prior) in m.weights(l).as_slice().iter().zip(before.weights(l).as_slice()) {
                assert!((after - prior * factor).abs() < 1e-15);
            }
            assert_eq!(m.biases(l), before.biases(l));
        }
    }

    #[test]
    fn l2_is_added_to_weight_gradients_only() {
        let mut m = model();
        let before = m.clone();
        let grads = Gradients::zeros(&m.param_shapes());
        let config = OptimizerConfig { learning_rate: 0.1, l2: 0.5, ..Default::default() };
        let mut opt = Optimizer::new(config, &m).unwrap();

        opt.apply(&mut m, &grads).unwrap();

        // W - lr · (0 + l2·W) = W · (1 - 0.05)
        for (after, prior) in m.weights(0).as_slice().iter().zip(before.weights(0).as_slice()) {
            assert!((after - prior * 0.95).abs() < 1e-12);
        }
        assert_eq!(m.biases(0), before.biases(0));
    }

    #[test]
    fn momentum_is_an_exponential_average() {
        let mut m = model();
        let before = m.clone();
        let mut grads = Gradients::zeros(&m.param_shapes());
        grads.d_biases[1].as_mut_slice()[0] = 1.0;

        let config = OptimizerConfig { learning_rate: 1.0, momentum: 0.9, ..Default::default() };
        let mut opt = Optimizer::new(config, &m).unwrap();

        opt.apply(&mut m, &grads).unwrap();
        // v = 0.1 · 1
        assert!((opt.velocity().1[1].as_slice()[0] - 0.1).abs() < 1e-12);
        assert!((m.biases(1).as_slice()[0] - (before.biases(1).as_slice()[0] - 0.1)).abs() < 1e-12);

        opt.apply(&mut m, &grads).unwrap();
        // v = 0.9 · 0.1 + 0.1 · 1 = 0.19
        assert!((opt.velocity().1[1].as_slice()[0] - 0.19).abs() < 1e-12);
        assert!((m.biases(1).as_slice()[0] - (before.biases(1).as_slice()[0] - 0.29)).abs() < 1e-12);
    }

    #[test]
    fn rejects_a_model_of_another_shape() {
        let m = model();
        let mut other = Mlp::with_seed(&[2, 4, 1], Activation::Tanh, 1).unwrap();
        let mut opt = Optimizer::new(OptimizerConfig::default(), &m).unwrap();
        let grads = Gradients::zeros(&other.param_shapes());
        assert!(matches!(opt.apply(&mut other, &grads), Err(Error::ShapeMismatch { .. })));
    }
}
