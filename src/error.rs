use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format Error at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Config Error: {0}")]
    Config(String),
}
