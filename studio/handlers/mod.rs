pub mod model;
pub mod points;
pub mod runs;
pub mod train;
