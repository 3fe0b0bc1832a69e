pub mod runs;
pub mod session;
pub mod tick_stats;
pub mod train_config;
pub mod trainer;

pub use runs::{ChartBounds, LossSample, Run, RunHistory};
pub use session::{Session, SessionStatus, TrainingStatus};
pub use tick_stats::TickStats;
pub use train_config::SessionConfig;
pub use trainer::{train_step, train_tick};
