use std::sync::{Arc, Mutex, MutexGuard, atomic::{AtomicBool, Ordering}};

use ferrite_playground::Session;

/// The one playground served by the studio.
pub struct StudioState {
    pub session: Session,
    /// Stop flag of the running background trainer, if any.
    pub trainer: Option<Arc<AtomicBool>>,
}

impl StudioState {
    pub fn new() -> Self {
        StudioState { session: Session::new(), trainer: None }
    }

    /// Signals the background trainer (if any) to exit after its current tick.
    pub fn halt_trainer(&mut self) {
        if let Some(flag) = self.trainer.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

/// `Arc<Mutex<StudioState>>` handed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

/// Locks the state, recovering the guard if a handler panicked while
/// holding it.
pub fn lock(state: &SharedState) -> MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
