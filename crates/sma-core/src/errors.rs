use std::path::PathBuf;

/// Core error type for the agent.
///
/// Only fatal conditions live here. Bad command arguments, unknown aliases and
/// stale listing indices are answered with a chat reply instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed alias file {path}: {source}")]
    AliasFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
