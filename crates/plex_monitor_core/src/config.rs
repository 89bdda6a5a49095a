use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::{SetupError, TOKEN_HELP_URL};

pub const PLACEHOLDER_TOKEN: &str = "YOUR_PLEX_TOKEN_HERE";
pub const DEFAULT_PLEX_URL: &str = "http://localhost:32400";
pub const DEFAULT_OUTPUT_DIR: &str = "./data";
pub const DEFAULT_CSV_FILENAME: &str = "plex_library_{library}_{date}.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_csv_filename() -> String {
    DEFAULT_CSV_FILENAME.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    pub plex_url: String,
    pub plex_token: String,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_csv_filename")]
    pub csv_filename: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            plex_url: DEFAULT_PLEX_URL.to_string(),
            plex_token: PLACEHOLDER_TOKEN.to_string(),
            libraries: vec!["Movies".to_string(), "TV Shows".to_string()],
            output_dir: default_output_dir(),
            csv_filename: default_csv_filename(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl MonitorConfig {
    /// Reads the config at `path`.
    ///
    /// A missing file is replaced by the default template and reported as
    /// [`SetupError::ConfigCreated`]; a token still set to
    /// [`PLACEHOLDER_TOKEN`] is rejected.
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                error!(path = %path.display(), "config file not found");
                info!("creating default config file");
                write_default(path).map_err(|source| SetupError::WriteConfig {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(path = %path.display(), "created config, update it with your Plex details");
                return Err(SetupError::ConfigCreated(path.to_path_buf()));
            }
            Err(source) => {
                return Err(SetupError::ReadConfig {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: MonitorConfig =
            serde_json::from_str(&content).map_err(|source| SetupError::InvalidConfig {
                path: path.to_path_buf(),
                source,
            })?;
        config.apply_defaults();

        if config.plex_token == PLACEHOLDER_TOKEN {
            error!(path = %path.display(), "plex_token has not been set");
            info!("to find your Plex token see {TOKEN_HELP_URL}");
            return Err(SetupError::PlaceholderToken(path.to_path_buf()));
        }
        Ok(config)
    }

    pub fn apply_defaults(&mut self) {
        if self.csv_filename.trim().is_empty() {
            self.csv_filename = default_csv_filename();
        }
        if self.output_dir.trim().is_empty() {
            self.output_dir = default_output_dir();
        }
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
    }

    pub fn output_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn write_default(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&MonitorConfig::default())?;
    fs::write(path, json)
}
