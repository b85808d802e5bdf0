//! # Colonia Server
//!
//! Authoritative game server.
//!
//! Owns the game state and is its only writer: inbound messages, AI
//! missions and turn changes are processed one at a time by a single actor
//! task. Outbound messages are queued by delivery priority.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod queue;
pub mod server;

use std::path::Path;

use col_core::error::GameError;
use col_core::map_generation::MapConfig;
use col_core::protocol::WireError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// An inbound record could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A game operation failed.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The configuration file could not be read or parsed.
    #[error("Failed to load config '{path}': {message}")]
    Config {
        /// Path of the file.
        path: String,
        /// Error message.
        message: String,
    },

    /// The server task has stopped.
    #[error("Server is not running")]
    Closed,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Maximum players per game.
    pub max_players: u8,
    /// Seed for AI decisions such as wandering.
    pub ai_seed: u64,
    /// Map to generate for a new game.
    pub map: MapConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3541,
            max_players: 8,
            ai_seed: 0,
            map: MapConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from RON. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ServerError> {
        ron::from_str(text).map_err(|e| ServerError::Config {
            path: "<ron>".into(),
            message: e.to_string(),
        })
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ServerError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron(&text).map_err(|e| match e {
            ServerError::Config { message, .. } => ServerError::Config {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Set the AI seed.
    #[must_use]
    pub const fn with_ai_seed(mut self, seed: u64) -> Self {
        self.ai_seed = seed;
        self
    }

    /// Set the map configuration.
    #[must_use]
    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }
}
