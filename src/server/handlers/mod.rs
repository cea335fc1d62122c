//! HTTP handlers for the server.

pub mod session;
pub mod styles;
