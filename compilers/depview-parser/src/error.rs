use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// The parser produced no analysis for the input. Never retried.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("The sentence cannot be parsed: {0}")]
    Rejected(String),

    #[error("Sentence has {len} tokens, over the maximum of {max}")]
    TooLong { len: usize, max: usize },

    #[error("Sentence is empty")]
    Empty,

    #[error("Token is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Cannot read parse bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed parse bank: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse bank archive rejected: {0}")]
    Archive(String),

    #[error("Invalid parse bank: {0}")]
    Invalid(String),
}
