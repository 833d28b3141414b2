pub mod server;

pub use server::{build_router, serve, serve_with_listener, AppState};
