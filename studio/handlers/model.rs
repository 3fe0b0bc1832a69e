use log::info;
use tiny_http::Request;

use ferrite_playground::SessionConfig;
use ferrite_playground::playground::boundary::DEFAULT_RESOLUTION;

use crate::routes::{bad_request, error_response, ok, query_get, read_json, JsonResponse};
use crate::state::{lock, SharedState};

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_status(state: &SharedState) -> JsonResponse {
    let st = lock(state);
    ok(&st.session.status())
}

// ---------------------------------------------------------------------------
// POST /model/build
// ---------------------------------------------------------------------------

pub fn handle_build(request: &mut Request, state: &SharedState) -> JsonResponse {
    let config: SessionConfig = match read_json(request) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut st = lock(state);
    match st.session.build(config) {
        Ok(()) => {
            // A rebuilt model starts idle; the old trainer must not keep going.
            st.halt_trainer();
            info!("model built: {:?}", st.session.model().map(|m| m.sizes().to_vec()));
            ok(&st.session.status())
        }
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// POST /model/reset
// ---------------------------------------------------------------------------

pub fn handle_reset(state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    match st.session.reset() {
        Ok(()) => {
            st.halt_trainer();
            ok(&st.session.status())
        }
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// GET /boundary?n=80
// ---------------------------------------------------------------------------

pub fn handle_boundary(query: &str, state: &SharedState) -> JsonResponse {
    let resolution = match query_get(query, "n") {
        None => DEFAULT_RESOLUTION,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n <= 400 => n,
            _ => return bad_request("n must be an integer between 2 and 400"),
        },
    };

    let st = lock(state);
    match st.session.decision_grid(resolution) {
        Ok(grid) => {
            let colors = grid.colors();
            ok(&serde_json::json!({
                "resolution": grid.resolution,
                "probabilities": grid.probabilities,
                "colors": colors,
            }))
        }
        Err(e) => error_response(e),
    }
}
