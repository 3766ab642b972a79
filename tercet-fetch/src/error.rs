use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Primary content field '{0}' not found")]
    MissingPrimaryField(String),

    #[error("Expected 3 lines, found {found}")]
    LineCountMismatch { found: usize },

    #[error("Line {line} is {length} characters long (max {max})")]
    LineTooLong { line: usize, length: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FetchError>;
