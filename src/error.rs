//! Error types for mail-autoconfig

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed email address \"{0}\"")]
    MalformedEmail(String),

    #[error("No configuration found for domain \"{0}\"")]
    NotFound(String),

    #[error("Unrecognized server type \"{0}\"")]
    UnrecognizedServerType(String),

    #[error("Unable to read aliases file \"{path}\": {source}")]
    Resolver {
        path: String,
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
