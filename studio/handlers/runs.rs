use serde_json::json;

use crate::routes::{error_response, ok, JsonResponse};
use crate::state::{lock, SharedState};

// ---------------------------------------------------------------------------
// GET /runs
// ---------------------------------------------------------------------------

pub fn handle_list(state: &SharedState) -> JsonResponse {
    let st = lock(state);
    ok(st.session.runs())
}

// ---------------------------------------------------------------------------
// POST /runs
// ---------------------------------------------------------------------------

pub fn handle_new(state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    let id = st.session.new_run().id.clone();
    ok(&json!({ "id": id, "active": id }))
}

// ---------------------------------------------------------------------------
// GET /runs/bounds
// ---------------------------------------------------------------------------

pub fn handle_bounds(state: &SharedState) -> JsonResponse {
    let st = lock(state);
    ok(&st.session.runs().bounds())
}

// ---------------------------------------------------------------------------
// POST /runs/{id}/select
// ---------------------------------------------------------------------------

pub fn handle_select(id: &str, state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    match st.session.runs_mut().select(id) {
        Ok(()) => ok(&json!({ "active": id })),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// DELETE /runs/{id}
// ---------------------------------------------------------------------------

pub fn handle_delete(id: &str, state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    match st.session.runs_mut().delete(id) {
        Ok(()) => ok(&json!({ "active": st.session.runs().active_id() })),
        Err(e) => error_response(e),
    }
}
