//! k3s-suite dashboard server.
//!
//! Serves the dashboard's JSON API over axum and hands the heavy lifting to
//! `libsuite`. The binary in `main.rs` only parses flags, sets up logging
//! and calls [`server::run`].

pub mod context;
pub mod error;
pub mod minikube;
pub mod routes;
pub mod server;
pub mod state;
pub mod version;
