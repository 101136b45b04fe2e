//! tally server library entry.
//!
//! This crate wires the counter store, config, CORS middleware, and HTTP
//! routes into a runnable service. It is intended to be consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod cors;
pub mod router;
pub mod routes;
