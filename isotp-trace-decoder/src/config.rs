//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder
//! library. Process concerns (output files, logging verbosity, config file
//! loading) are handled by the application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Whether to run one reassembly worker per identifier on a thread
    /// pool (true) or decode the identifier groups sequentially (false)
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Optional: only decode frames with these CAN identifiers
    #[serde(default)]
    pub id_filter: Option<Vec<u32>>,
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            id_filter: None,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable parallel decoding
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Builder method: set the identifier filter
    pub fn with_id_filter(mut self, ids: Vec<u32>) -> Self {
        self.id_filter = Some(ids);
        self
    }

    /// Check if a CAN identifier should be processed
    pub fn should_process_id(&self, can_id: u32) -> bool {
        match &self.id_filter {
            Some(ids) => ids.contains(&can_id),
            None => true,
        }
    }
}
