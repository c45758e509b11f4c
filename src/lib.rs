//! Reduction Print - photographs to reduction-print plans
//!
//! Service around the `print-layers` engine: project lifecycle,
//! filesystem persistence and the HTTP API.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
