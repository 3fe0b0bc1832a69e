use serde::Deserialize;
use serde_json::json;
use tiny_http::Request;

use ferrite_playground::LabeledPoint;

use crate::routes::{error_response, ok, read_json, JsonResponse};
use crate::state::{lock, SharedState};

#[derive(Deserialize)]
struct EraseRequest {
    x: f64,
    y: f64,
    radius: f64,
}

// ---------------------------------------------------------------------------
// GET /points
// ---------------------------------------------------------------------------

pub fn handle_list(state: &SharedState) -> JsonResponse {
    let st = lock(state);
    ok(st.session.points())
}

// ---------------------------------------------------------------------------
// POST /points
// ---------------------------------------------------------------------------

pub fn handle_add(request: &mut Request, state: &SharedState) -> JsonResponse {
    let point: LabeledPoint = match read_json(request) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let mut st = lock(state);
    match st.session.add_point(point) {
        Ok(()) => ok(&json!({ "points": st.session.points().len() })),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// POST /points/erase
// ---------------------------------------------------------------------------

pub fn handle_erase(request: &mut Request, state: &SharedState) -> JsonResponse {
    let req: EraseRequest = match read_json(request) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut st = lock(state);
    let removed = st.session.erase_points(req.x, req.y, req.radius);
    ok(&json!({ "removed": removed, "points": st.session.points().len() }))
}

// ---------------------------------------------------------------------------
// POST /points/clear
// ---------------------------------------------------------------------------

pub fn handle_clear(state: &SharedState) -> JsonResponse {
    let mut st = lock(state);
    st.session.clear_points();
    ok(&json!({ "points": 0 }))
}
