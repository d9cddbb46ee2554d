use std::path::PathBuf;

/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the
/// dispatcher can decide between a friendly reply and a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to write {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt state in {path}: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

/// Bad user input. Always recoverable; the dispatcher turns it into a reply.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task text is empty")]
    EmptyTask,

    #[error("the to-do list is empty")]
    EmptyList,

    #[error("task number is missing")]
    MissingIndex,

    #[error("task number {0:?} is not a whole number")]
    NotAnInteger(String),

    #[error("task number {index} is outside 1..={len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("no user supplied")]
    MissingUser,

    #[error("{0:?} is not a single user name or mention")]
    InvalidUser(String),

    #[error("unknown user: {0}")]
    UnknownUser(String),
}

pub type Result<T> = std::result::Result<T, Error>;
