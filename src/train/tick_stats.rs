use serde::Serialize;

/// Summary of one training tick, returned by
/// [`Session::tick`](crate::train::session::Session::tick).
#[derive(Debug, Clone, Serialize)]
pub struct TickStats {
    /// Single-sample updates run in this tick.
    pub steps: usize,
    /// Cumulative step count since the model was built.
    pub step_count: u64,
    /// Mean of `0.5 · err²` over the tick's updates.
    pub avg_loss: f64,
    /// Run the sample was recorded into.
    pub run_id: Option<String>,
}
