use thiserror::Error;

/// Errors that abort an export. A failed export never yields partial bytes.
#[derive(Error, Debug)]
pub enum Error {
    /// A block could not be laid out even on a fresh page.
    #[error("render failure: {0}")]
    Render(String),

    /// A configured font file could not be read or parsed.
    #[error("font error: {0}")]
    Font(String),

    /// The record violates a constraint the layout depends on.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
