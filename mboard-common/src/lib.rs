//! # mboard Common Library
//!
//! Shared code for the mboard service and its tooling:
//! - Database initialization and row models
//! - Credential primitives (password hashing, session tokens)
//! - Configuration loading and root folder resolution
//! - Calendar date helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
