use crate::math::matrix::Matrix;

/// Intermediate values recorded by [`Mlp::forward_training`] for the
/// backward pass.
///
/// `z[l]` is the pre-activation of layer `l`, `a[l + 1]` its activation, and
/// `a[0]` the input column. The cache belongs to the caller; the model keeps
/// nothing between calls.
///
/// [`Mlp::forward_training`]: crate::network::mlp::Mlp::forward_training
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub(crate) z: Vec<Matrix>,
    pub(crate) a: Vec<Matrix>,
}

impl ForwardCache {
    pub(crate) fn new(input: Matrix) -> ForwardCache {
        ForwardCache { z: Vec::new(), a: vec![input] }
    }

    pub(crate) fn push(&mut self, z: Matrix, a: Matrix) {
        self.z.push(z);
        self.a.push(a);
    }

    pub fn pre_activations(&self) -> &[Matrix] {
        &self.z
    }

    pub fn activations(&self) -> &[Matrix] {
        &self.a
    }

    /// Number of layers recorded.
    pub fn depth(&self) -> usize {
        self.z.len()
    }

    /// The network's prediction: the last recorded activation.
    pub fn output(&self) -> &Matrix {
        // `a` always holds at least the input.
        &self.a[self.a.len() - 1]
    }
}
