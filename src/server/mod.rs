//! HTTP layer: the axum server, route handlers, and request/response types.

pub mod routes;
pub mod server;
pub mod types;

pub use server::ApiServer;
