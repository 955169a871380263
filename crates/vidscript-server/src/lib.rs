//! vidscript server: axum HTTP API over the extraction engine, script
//! generator and store.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
