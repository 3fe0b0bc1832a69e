use std::io::Cursor;
use serde::Serialize;
use serde_json::json;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use ferrite_playground::Error;

use crate::handlers;
use crate::state::SharedState;

pub type JsonResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub fn json_response<T: Serialize>(status: u16, body: &T) -> JsonResponse {
    let bytes = serde_json::to_vec(body)
        .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {e}"}}"#).into_bytes());
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![Header::from_bytes(b"Content-Type", b"application/json").unwrap()],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn ok<T: Serialize>(body: &T) -> JsonResponse {
    json_response(200, body)
}

pub fn bad_request(message: impl Into<String>) -> JsonResponse {
    json_response(400, &json!({ "error": message.into() }))
}

pub fn not_found() -> JsonResponse {
    json_response(404, &json!({ "error": "not found" }))
}

/// Maps a library error to a JSON error response.
pub fn error_response(err: Error) -> JsonResponse {
    let status = match err {
        Error::UnknownRun(_) => 404,
        _ => 400,
    };
    json_response(status, &json!({ "error": err.to_string() }))
}

/// Reads and deserializes a JSON request body. An empty body is read as `{}`.
pub fn read_json<T: serde::de::DeserializeOwned>(request: &mut Request) -> Result<T, JsonResponse> {
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        return Err(bad_request(format!("could not read body: {e}")));
    }
    let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| bad_request(format!("invalid JSON: {e}")))
}

/// Looks up `key` in a `k=v&k2=v2` query string.
pub fn query_get<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers receive a `&mut Request` so that the dispatcher retains ownership
/// and can call `request.respond(response)` at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path.to_owned(), query.to_owned()),
        None => (url.clone(), String::new()),
    };
    log::debug!("{} {}", method, url);

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let response = match (&method, segments.as_slice()) {
        // ── Status ───────────────────────────────────────────────────────
        (Method::Get, [""]) => handlers::model::handle_status(&state),

        // ── Points ───────────────────────────────────────────────────────
        (Method::Get,  ["points"])          => handlers::points::handle_list(&state),
        (Method::Post, ["points"])          => handlers::points::handle_add(&mut request, &state),
        (Method::Post, ["points", "erase"]) => handlers::points::handle_erase(&mut request, &state),
        (Method::Post, ["points", "clear"]) => handlers::points::handle_clear(&state),

        // ── Model ────────────────────────────────────────────────────────
        (Method::Post, ["model", "build"]) => handlers::model::handle_build(&mut request, &state),
        (Method::Post, ["model", "reset"]) => handlers::model::handle_reset(&state),
        (Method::Get,  ["boundary"])       => handlers::model::handle_boundary(&query, &state),

        // ── Train ────────────────────────────────────────────────────────
        (Method::Post, ["train", "step"])  => handlers::train::handle_step(&state),
        (Method::Post, ["train", "start"]) => handlers::train::handle_start(&state),
        (Method::Post, ["train", "stop"])  => handlers::train::handle_stop(&state),

        // ── Runs ─────────────────────────────────────────────────────────
        (Method::Get,    ["runs"])               => handlers::runs::handle_list(&state),
        (Method::Post,   ["runs"])               => handlers::runs::handle_new(&state),
        (Method::Get,    ["runs", "bounds"])     => handlers::runs::handle_bounds(&state),
        (Method::Post,   ["runs", id, "select"]) => handlers::runs::handle_select(id, &state),
        (Method::Delete, ["runs", id])           => handlers::runs::handle_delete(id, &state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}
