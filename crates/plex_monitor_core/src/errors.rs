use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub const TOKEN_HELP_URL: &str =
    "https://support.plex.tv/articles/204059436-finding-an-authentication-token-x-plex-token/";

#[derive(Debug, Error)]
pub enum PlexError {
    #[error("invalid Plex server URL: {0}")]
    InvalidUrl(String),
    #[error("Plex token is not a valid header value: {0}")]
    InvalidToken(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("response is not valid Plex JSON: {0}")]
    InvalidJson(String),
    #[error("library section not found: {0}")]
    LibraryNotFound(String),
    #[error("file operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("library export failed: {0}")]
    Core(#[from] PlexError),
    #[error("{0}")]
    Context(String),
}

impl ExportError {
    pub fn context<T: Into<String>>(self, message: T) -> Self {
        let message = message.into();
        match self {
            ExportError::Core(err) => ExportError::Context(format!("{message}: {err}")),
            ExportError::Context(existing) => {
                ExportError::Context(format!("{message}: {existing}"))
            }
        }
    }
}

/// Conditions that stop a run before any library is exported.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("config file not found; wrote a default template to {0}, update it with your Plex details")]
    ConfigCreated(PathBuf),
    #[error("plex_token in {0} is still the placeholder value, see {TOKEN_HELP_URL}")]
    PlaceholderToken(PathBuf),
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write default config {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to connect to Plex: {0}")]
    Connection(#[source] PlexError),
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}
