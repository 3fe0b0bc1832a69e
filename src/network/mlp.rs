use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::dense::{Dense, LayerUpdate};
use crate::math::matrix::Matrix;
use crate::network::cache::ForwardCache;
use crate::network::gradients::{Gradients, ParamShapes};

/// A dense feed-forward network with one activation shared by every layer.
///
/// Layer `l` maps `sizes[l]` inputs to `sizes[l + 1]` outputs. The model owns
/// its parameters outright: every change goes through [`Mlp::apply_update`]
/// (or [`Mlp::step`], which is built on it).
#[derive(Debug, Clone)]
pub struct Mlp {
    sizes: Vec<usize>,
    activation: Activation,
    layers: Vec<Dense>,
}

impl Mlp {
    /// Builds a randomly initialised network using the thread RNG.
    pub fn new(sizes: &[usize], activation: Activation) -> Result<Mlp> {
        Mlp::with_rng(sizes, activation, &mut rand::thread_rng())
    }

    /// Like [`Mlp::new`] but reproducible.
    pub fn with_seed(sizes: &[usize], activation: Activation, seed: u64) -> Result<Mlp> {
        Mlp::with_rng(sizes, activation, &mut StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: Rng + ?Sized>(
        sizes: &[usize],
        activation: Activation,
        rng: &mut R,
    ) -> Result<Mlp> {
        validate_sizes(sizes)?;

        let layers = sizes
            .windows(2)
            .map(|pair| Dense::new(pair[0], pair[1], rng))
            .collect();

        info!("built mlp {:?} with {} activation", sizes, activation);
        Ok(Mlp { sizes: sizes.to_vec(), activation, layers })
    }

    /// Resolves `activation` by name, then builds. Unknown names fail before
    /// any weights are allocated.
    pub fn build(sizes: &[usize], activation: &str) -> Result<Mlp> {
        let activation: Activation = activation.parse()?;
        Mlp::new(sizes, activation)
    }

    /// Builds a network around explicit parameters.
    ///
    /// `weights[l]` must be `(n_{l+1} × n_l)` and `biases[l]` `(n_{l+1} × 1)`,
    /// with each layer's column count matching the previous layer's rows.
    pub fn from_parameters(
        activation: Activation,
        weights: Vec<Matrix>,
        biases: Vec<Matrix>,
    ) -> Result<Mlp> {
        if weights.is_empty() {
            return Err(Error::InvalidLayerSizes("at least one layer is required".into()));
        }
        if weights.len() != biases.len() {
            return Err(Error::InvalidLayerSizes(format!(
                "{} weight matrices but {} bias vectors",
                weights.len(),
                biases.len()
            )));
        }

        let mut sizes = vec![weights[0].cols()];
        for (w, b) in weights.iter().zip(&biases) {
            let fan_in = sizes[sizes.len() - 1];
            if w.cols() != fan_in {
                return Err(Error::ShapeMismatch {
                    op: "from_parameters",
                    left: (fan_in, 1),
                    right: w.shape(),
                });
            }
            if b.shape() != (w.rows(), 1) {
                return Err(Error::ShapeMismatch {
                    op: "from_parameters",
                    left: w.shape(),
                    right: b.shape(),
                });
            }
            sizes.push(w.rows());
        }
        validate_sizes(&sizes)?;

        let layers = weights
            .into_iter()
            .zip(biases)
            .map(|(weights, biases)| Dense { weights, biases })
            .collect();
        Ok(Mlp { sizes, activation, layers })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn weights(&self, layer: usize) -> &Matrix {
        &self.layers[layer].weights
    }

    pub fn biases(&self, layer: usize) -> &Matrix {
        &self.layers[layer].biases
    }

    pub fn param_shapes(&self) -> ParamShapes {
        ParamShapes {
            weights: self.layers.iter().map(|l| l.weights.shape()).collect(),
            biases: self.layers.iter().map(|l| l.biases.shape()).collect(),
        }
    }

    /// Inference pass. Returns the output column `(sizes[L] × 1)`.
    pub fn forward(&self, input: &[f64]) -> Result<Matrix> {
        let mut current = self.input_column(input)?;
        for layer in &self.layers {
            let (_, a) = layer.feed(&current, self.activation)?;
            current = a;
        }
        Ok(current)
    }

    /// Training pass: the same output as [`Mlp::forward`] plus the cache
    /// [`Mlp::backward`] needs.
    pub fn forward_training(&self, input: &[f64]) -> Result<(Matrix, ForwardCache)> {
        let mut cache = ForwardCache::new(self.input_column(input)?);
        for layer in &self.layers {
            let (z, a) = layer.feed(cache.output(), self.activation)?;
            cache.push(z, a);
        }
        Ok((cache.output().clone(), cache))
    }

    /// Backpropagates the half squared error against `label`.
    ///
    /// The output error is `prediction - label` with no activation
    /// derivative applied; hidden errors are `(W_{l+1}ᵀ · delta) ⊙ f'(z_l)`.
    /// `cache` must come from the latest `forward_training` call on this
    /// model; that is not checked.
    pub fn backward(&self, label: &[f64], cache: &ForwardCache) -> Result<Gradients> {
        let depth = self.layers.len();
        if cache.depth() != depth {
            return Err(Error::ShapeMismatch {
                op: "backward",
                left: (depth, 1),
                right: (cache.depth(), 1),
            });
        }

        let target = Matrix::column(label);
        let mut delta = cache.output().sub(&target)?;

        let mut d_weights = Vec::with_capacity(depth);
        let mut d_biases = Vec::with_capacity(depth);

        for l in (0..depth).rev() {
            let (w_grad, b_grad) = self.layers[l].compute_gradients(&delta, &cache.a[l])?;
            if l > 0 {
                let f_prime = self.activation.apply_derivative(&cache.z[l - 1]);
                delta = self.layers[l].propagate(&delta)?.hadamard(&f_prime)?;
            }
            d_weights.push(w_grad);
            d_biases.push(b_grad);
        }

        d_weights.reverse();
        d_biases.reverse();
        Ok(Gradients { d_weights, d_biases })
    }

    /// Plain gradient step: `W -= lr·dW`, `b -= lr·db`.
    pub fn step(&mut self, grads: &Gradients, lr: f64) -> Result<()> {
        self.check_gradients(grads)?;
        for (l, (dw, db)) in grads.d_weights.iter().zip(&grads.d_biases).enumerate() {
            self.apply_update(
                l,
                &LayerUpdate {
                    weight_scale: None,
                    weights_delta: dw.scale(lr),
                    biases_delta: db.scale(lr),
                },
            )?;
        }
        Ok(())
    }

    /// Applies one prepared update to layer `layer`. This is the only path
    /// through which parameters change.
    pub fn apply_update(&mut self, layer: usize, update: &LayerUpdate) -> Result<()> {
        let depth = self.layers.len();
        let target = self.layers.get_mut(layer).ok_or(Error::ShapeMismatch {
            op: "apply_update",
            left: (depth, 1),
            right: (layer + 1, 1),
        })?;
        target.apply_update(update)
    }

    fn check_gradients(&self, grads: &Gradients) -> Result<()> {
        if grads.num_layers() != self.layers.len() || grads.d_biases.len() != self.layers.len() {
            return Err(Error::ShapeMismatch {
                op: "gradients",
                left: (self.layers.len(), 1),
                right: (grads.num_layers(), grads.d_biases.len()),
            });
        }
        Ok(())
    }

    fn input_column(&self, input: &[f64]) -> Result<Matrix> {
        if input.len() != self.sizes[0] {
            return Err(Error::ShapeMismatch {
                op: "forward",
                left: (self.sizes[0], 1),
                right: (input.len(), 1),
            });
        }
        Ok(Matrix::column(input))
    }
}

fn validate_sizes(sizes: &[usize]) -> Result<()> {
    if sizes.len() < 2 {
        return Err(Error::InvalidLayerSizes(format!(
            "need at least an input and an output size, got {:?}",
            sizes
        )));
    }
    if sizes.iter().any(|&n| n == 0) {
        return Err(Error::InvalidLayerSizes(format!("sizes must be positive, got {:?}", sizes)));
    }
    Ok(())
}
