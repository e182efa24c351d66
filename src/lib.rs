//! Library crate for emoji-charade-back, exposing modules for the binary and integration tests.

/// Runtime configuration.
pub mod config;
/// Storage collaborators: question bank and leaderboard persistence.
pub mod dao;
/// Inbound parsing and outbound message rendering.
pub mod dto;
/// Controller errors.
pub mod error;
/// Round controller, hint scheduler, notifier and dispatch.
pub mod services;
/// Rounds, puzzles, leaderboard and the shared application state.
pub mod state;
