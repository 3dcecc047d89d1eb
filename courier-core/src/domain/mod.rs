//! Core domain types
//!
//! This module contains the core domain structures used across Courier crates.
//! They are shared between the runner (which mutates progress), the server
//! (which exposes it) and the client/CLI (which display it).

pub mod job;
pub mod log;
pub mod recipient;
