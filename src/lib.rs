pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod playground;
pub mod train;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use activation::activation::Activation;
pub use layers::dense::{Dense, LayerUpdate};
pub use network::{ForwardCache, Gradients, Mlp, ParamShapes};
pub use loss::half_mse::HalfMseLoss;
pub use optim::{Optimizer, OptimizerConfig, Sgd};
pub use playground::{DecisionGrid, LabeledPoint, PointSet};
pub use train::{
    LossSample, Run, RunHistory, Session, SessionConfig, TickStats, TrainingStatus,
};
