pub mod optimizer;
pub mod sgd;

pub use optimizer::{clip_gradients, Optimizer, OptimizerConfig};
pub use sgd::Sgd;
