/// Leaderboard persistence contract and the JSON file implementation.
pub mod leaderboard_store;
/// In-memory storage collaborators.
pub mod memory;
/// On-disk record definitions.
pub mod models;
/// Puzzle source contract and the JSON file implementation.
pub mod question_bank;
/// Storage error types shared by every backend.
pub mod storage;
