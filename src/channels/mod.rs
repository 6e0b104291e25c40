//! Inbound surfaces. Only HTTP is served; the CLI drives the pipeline
//! directly.

mod http;
mod server;
pub mod types;

pub use http::{AppState, routes};
pub use server::ApiServer;
