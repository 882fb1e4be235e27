//! Error handling and custom error types
//!
//! Every failure in a run is fatal. Variants are grouped into three kinds
//! (configuration, upstream service, local I/O) so the binary can report them
//! uniformly before exiting.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Empty response from text service: no {0} was generated")]
    EmptyGeneration(&'static str),

    #[error("Image generation blocked by the provider's safety filter")]
    ContentFiltered,

    #[error("Image payload error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Dream log error: {0}")]
    DreamLog(String),
}

/// Coarse classification used at the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Upstream,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Http(_)
            | Error::AiProvider(_)
            | Error::EmptyGeneration(_)
            | Error::ContentFiltered
            | Error::Image(_) => ErrorKind::Upstream,
            Error::Io(_) | Error::Serialization(_) | Error::DreamLog(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
