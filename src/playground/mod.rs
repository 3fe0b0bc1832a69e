pub mod boundary;
pub mod layers;
pub mod points;

pub use boundary::DecisionGrid;
pub use layers::{check_playground_sizes, parse_layers};
pub use points::{LabeledPoint, PointSet};
