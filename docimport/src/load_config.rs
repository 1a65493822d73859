//! `load_config` module: Loads an optional YAML config file into the importer's
//! [`ImportConfig`] plus the CLI-only store settings.
//!
//! # Responsibilities
//! - Parse user-supplied YAML into type-safe structs (every key is optional)
//! - Map loosely-typed YAML values (seconds, paths) onto core types
//! - Validate the result through [`ImportConfig::new`] so a bad file fails early
//!
//! # Errors
//! All errors use `anyhow::Error` for context-rich diagnostics and are surfaced
//! at the CLI boundary.
//!
//! Accepted schema:
//!
//! ```yaml
//! import:
//!   throttle_batch: 10
//!   throttle_pause_secs: 3
//!   skip_throttle: false
//!   import_internal: false
//! store:
//!   snapshot: ./docs-store.json
//! ```
use anyhow::{Context, Result};
use docimport_core::config::{DEFAULT_THROTTLE_BATCH, DEFAULT_THROTTLE_PAUSE};
use docimport_core::ImportConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_SNAPSHOT: &str = "docimport-store.json";

#[derive(Debug, Default)]
pub struct CliConfig {
    pub import: ImportConfig,
    pub store: StoreSection,
}

#[derive(Debug, Deserialize)]
pub struct ImportSection {
    #[serde(default = "default_throttle_batch")]
    pub throttle_batch: usize,
    #[serde(default = "default_throttle_pause_secs")]
    pub throttle_pause_secs: f64,
    #[serde(default)]
    pub skip_throttle: bool,
    #[serde(default)]
    pub import_internal: bool,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            throttle_batch: default_throttle_batch(),
            throttle_pause_secs: default_throttle_pause_secs(),
            skip_throttle: false,
            import_internal: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
        }
    }
}

fn default_throttle_batch() -> usize {
    DEFAULT_THROTTLE_BATCH
}

fn default_throttle_pause_secs() -> f64 {
    DEFAULT_THROTTLE_PAUSE.as_secs_f64()
}

fn default_snapshot() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT)
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    import: ImportSection,
    #[serde(default)]
    store: StoreSection,
}

/// Loads a YAML config file and validates it into a [`CliConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = if config_content.trim().is_empty() {
        RawConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    let pause_secs = raw.import.throttle_pause_secs;
    let throttle_pause = Duration::try_from_secs_f64(pause_secs).with_context(|| {
        format!(
            "import.throttle_pause_secs must be a non-negative number of seconds, got {}",
            pause_secs
        )
    })?;

    let import = ImportConfig::new(
        raw.import.throttle_batch,
        throttle_pause,
        raw.import.skip_throttle,
        raw.import.import_internal,
    )
    .with_context(|| format!("Invalid import section in {}", path_ref.display()))?;

    Ok(CliConfig {
        import,
        store: raw.store,
    })
}
