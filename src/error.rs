use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse Error (line {line}): {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid Shape {id}: {reason}")]
    InvalidShape { id: usize, reason: String },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

impl PackError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;
