pub mod half_mse;

pub use half_mse::HalfMseLoss;
