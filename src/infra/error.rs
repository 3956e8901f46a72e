use thiserror::Error;

use crate::infra::Position;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Invalid location: start {start:?}, target {target:?}")]
    InvalidLocation { start: Position, target: Position },

    #[error("Invalid path: route to {0:?} has no steps")]
    InvalidPath(Position),

    #[error("Target {target:?} unreachable after visiting {visited} cells")]
    Unreachable { target: Position, visited: usize },

    #[error("Search invariant violated: {0}")]
    InternalInvariant(String),
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
