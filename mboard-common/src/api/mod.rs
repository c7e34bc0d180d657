//! Shared HTTP API functionality
//!
//! Contains ONLY pure functions and shared types (no HTTP framework
//! dependencies). The server wraps these with its own extractors and handlers.

pub mod auth;

pub use auth::{
    generate_session_token, hash_password, hash_session_token, is_valid_email, normalize_email,
    verify_password, PasswordHashError, DEFAULT_PBKDF2_ITERATIONS, MIN_PASSWORD_LENGTH,
};
