pub mod dense;

pub use dense::{Dense, LayerUpdate};
