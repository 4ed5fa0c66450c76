use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the library layer.
///
/// The CLI and analyzer closures work with `anyhow`; everything that crosses
/// the library boundary is one of these.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid registration or configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A backing file could not be read or written.
    #[error("Storage error at {}: {message}", path.display())]
    Storage { path: PathBuf, message: String },

    /// An analyzer failed while running.
    #[error("Analyzer '{analyzer}' failed: {message}")]
    Analyzer { analyzer: String, message: String },
}

impl Error {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Error::Configuration(message.into())
    }

    pub fn storage<P: Into<PathBuf>, S: ToString>(path: P, message: S) -> Self {
        Error::Storage {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn analyzer<A: Into<String>, S: ToString>(analyzer: A, message: S) -> Self {
        Error::Analyzer {
            analyzer: analyzer.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
