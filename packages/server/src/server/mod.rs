// HTTP server setup (Axum + server-rendered views)
pub mod app;
pub mod routes;
pub mod session;
pub mod views;

pub use app::*;
