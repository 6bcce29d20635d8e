use std::{io, path::Path};

use egui::Vec2;
use spatial_picker::PickerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(serde::Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub viewport: Vec2,
    pub picker: PickerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: [800.0, 600.0].into(),
            picker: PickerConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to the defaults when the file does not exist.
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = || path.display().to_string();
        match std::fs::File::open(path) {
            Ok(f) => serde_json::from_reader(io::BufReader::new(f)).map_err(|source| {
                ConfigError::Parse {
                    path: display(),
                    source,
                }
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at '{}', using defaults", display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: display(),
                source,
            }),
        }
    }
}
