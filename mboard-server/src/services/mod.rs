//! Operations spanning several queries

pub mod access;
pub mod board;
pub mod edits;
pub mod reorder;
pub mod tasks;
