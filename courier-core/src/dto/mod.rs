//! Data Transfer Objects for the HTTP API
//!
//! Request and response bodies shared by the server (which produces them)
//! and the client/CLI (which consume them).

pub mod job;
pub mod system;
