use crate::{error::Result, network::gradients::Gradients, network::mlp::Mlp};

/// Plain SGD with a fixed learning rate and no state.
///
/// Equivalent to an [`Optimizer`](crate::optim::optimizer::Optimizer) with
/// every coefficient at zero, without binding to a model shape.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one SGD update to every layer of `model`.
    pub fn step(&self, model: &mut Mlp, grads: &Gradients) -> Result<()> {
        model.step(grads, self.learning_rate)
    }
}
