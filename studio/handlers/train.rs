use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use serde_json::json;

use ferrite_playground::Error;

use crate::routes::{error_response, ok, JsonResponse};
use crate::state::{lock, SharedState};

/// Pause between background ticks, roughly one animation frame.
const FRAME: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// POST /train/step
// ---------------------------------------------------------------------------

pub fn handle_step(state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    match st.session.tick() {
        Ok(stats) => ok(&stats),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

pub fn handle_start(state: &SharedState) -> JsonResponse {
    let mut st = lock(state);

    // Guard: need a model and some points.
    if st.session.model().is_none() {
        return error_response(Error::NoModel);
    }
    if st.session.points().is_empty() {
        return error_response(Error::NoPoints);
    }

    // If already running, don't start another.
    if !st.session.start() {
        return ok(&st.session.status());
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    st.trainer = Some(stop_flag.clone());
    let status = st.session.status();
    drop(st);

    let state_clone = state.clone();
    thread::spawn(move || run_trainer(state_clone, stop_flag));

    ok(&status)
}

/// Ticks the session once per frame until stopped. Each tick holds the lock
/// for its whole duration, so a stop request lands between ticks.
fn run_trainer(state: SharedState, stop_flag: Arc<AtomicBool>) {
    info!("background training started");
    loop {
        if stop_flag.load(Ordering::Relaxed) {
            break;
        }
        {
            let mut st = lock(&state);
            if !st.session.is_training() {
                break;
            }
            if let Err(e) = st.session.tick() {
                warn!("background training stopped: {e}");
                st.session.stop();
                st.trainer = None;
                break;
            }
        }
        thread::sleep(FRAME);
    }
    info!("background training finished");
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    st.halt_trainer();
    let was_training = st.session.stop();
    ok(&json!({ "stopped": was_training, "status": st.session.status() }))
}
