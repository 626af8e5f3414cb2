/// Run configuration, built once and passed explicitly to every component.
use crate::scanner::hasher::HashAlgorithm;
use crate::time_codec::Zone;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default directory that receives every report.
pub const DEFAULT_OUTPUT_DIR: &str = "ProcessingOutput";

/// Default report file extension.
pub const DEFAULT_REPORT_EXTENSION: &str = "csv";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding all reports. Created if absent.
    pub output_dir: PathBuf,
    /// Digest algorithm; also names the digest column.
    pub hash: HashAlgorithm,
    /// Zone used to read listing timestamps and render report timestamps.
    pub time_zone: Zone,
    /// Extension of generated report files, without the dot.
    pub report_extension: String,
    /// Optional sub-directory of each snapshot to walk instead of the whole volume.
    pub walk_subpath: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            hash: HashAlgorithm::Md5,
            time_zone: Zone::Local,
            report_extension: DEFAULT_REPORT_EXTENSION.to_string(),
            walk_subpath: None,
        }
    }
}

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Full path of the report called `name`.
    pub fn report_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{name}.{}", self.report_extension))
    }
}
