//! Courier Core
//!
//! Core types and abstractions for the Courier bulk messaging service.
//!
//! This crate contains:
//! - Domain types: Core business entities (Recipient, JobProgress, LogEntry)
//! - DTOs: Request/response bodies shared by the server, client and CLI

pub mod domain;
pub mod dto;
