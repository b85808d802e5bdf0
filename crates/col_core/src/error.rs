//! Error types for the game model.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game model errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A region with this identifier is already registered.
    #[error("Region already exists: {0}")]
    DuplicateRegion(String),

    /// No region with this identifier is registered.
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    /// Coordinates outside the map.
    #[error("Tile ({x}, {y}) is outside the map")]
    InvalidCoordinate {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },

    /// Invalid object reference.
    #[error("Object not found: {0}")]
    ObjectNotFound(u64),

    /// An ASCII map could not be parsed.
    #[error("Failed to parse map at line {line}, column {column}: {message}")]
    MapParse {
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
        /// Error message.
        message: String,
    },

    /// A snapshot or data file could not be read or written.
    #[error("Persistence error for '{path}': {message}")]
    Persistence {
        /// Path involved.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
