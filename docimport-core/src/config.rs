use std::time::Duration;

use tracing::{debug, info};

use crate::error::ConfigError;

pub const DEFAULT_THROTTLE_BATCH: usize = 10;
pub const DEFAULT_THROTTLE_PAUSE: Duration = Duration::from_secs(3);

/// Settings for one importer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Pause after every this many items in a file's function loop and class loop.
    pub throttle_batch: usize,
    pub throttle_pause: Duration,
    /// Default for [`crate::importer::Importer::import`]; `import_file` takes it explicitly.
    pub skip_throttle: bool,
    /// Import entities tagged `@internal` instead of skipping them.
    pub import_internal: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            throttle_batch: DEFAULT_THROTTLE_BATCH,
            throttle_pause: DEFAULT_THROTTLE_PAUSE,
            skip_throttle: false,
            import_internal: false,
        }
    }
}

impl ImportConfig {
    pub fn new(
        throttle_batch: usize,
        throttle_pause: Duration,
        skip_throttle: bool,
        import_internal: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            throttle_batch,
            throttle_pause,
            skip_throttle,
            import_internal,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_batch == 0 {
            return Err(ConfigError::ZeroThrottleBatch);
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            throttle_batch = self.throttle_batch,
            throttle_pause_ms = self.throttle_pause.as_millis() as u64,
            skip_throttle = self.skip_throttle,
            import_internal = self.import_internal,
            "Loaded ImportConfig"
        );
        debug!(?self, "ImportConfig loaded (full debug)");
    }
}
