//! ferrite-playground Studio
//!
//! A JSON API over one playground session: paint points, build a model,
//! train it tick by tick or in the background, and read back loss runs and
//! the decision grid. Served by a synchronous tiny_http server.
//!
//! Run with:
//!   cargo run --bin studio --release
//! Then talk to http://127.0.0.1:7878 (override with FERRITE_STUDIO_ADDR).
//! Set RUST_LOG=info (or debug, for per-tick logs) to see what it does.

mod handlers;
mod routes;
mod state;

use std::sync::{Arc, Mutex};

use log::{error, info};
use tiny_http::Server;

use state::StudioState;

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = std::env::var("FERRITE_STUDIO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    let shared_state = Arc::new(Mutex::new(StudioState::new()));
    info!("studio listening on http://{addr}");

    // One thread per request, so a slow client never blocks the background
    // trainer or other requests for longer than one session lock.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}
