pub mod cache;
pub mod gradients;
pub mod mlp;

pub use cache::ForwardCache;
pub use gradients::{Gradients, ParamShapes};
pub use mlp::Mlp;
