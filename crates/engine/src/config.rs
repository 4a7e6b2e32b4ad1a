//! Engine tuning knobs.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```json
//! { "page_size": 10, "debounce_ms": 200 }
//! ```

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Listings revealed per page or load-more step (default: 20)
    pub page_size: usize,

    /// Listings fetched in one go for window pagination (default: 200)
    pub window_batch_size: usize,

    /// Quiet period before typed query text triggers a search (default: 350)
    pub debounce_ms: u64,

    /// Entries kept in the recent-search cache (default: 5)
    pub recent_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            window_batch_size: 200,
            debounce_ms: 350,
            recent_capacity: 5,
        }
    }
}

impl EngineConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_window_batch_size(mut self, window_batch_size: usize) -> Self {
        self.window_batch_size = window_batch_size;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis() as u64;
        self
    }

    pub fn with_recent_capacity(mut self, recent_capacity: usize) -> Self {
        self.recent_capacity = recent_capacity;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load overrides from a JSON file and validate the result
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(EngineError::Config("page_size must be positive".to_string()));
        }
        if self.window_batch_size == 0 {
            return Err(EngineError::Config("window_batch_size must be positive".to_string()));
        }
        if self.recent_capacity == 0 {
            return Err(EngineError::Config("recent_capacity must be positive".to_string()));
        }
        Ok(())
    }
}
