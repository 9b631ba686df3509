//! Decoder configuration types
//!
//! This module defines the small set of knobs the decoder exposes. Reporting
//! and file selection are handled by the application layer.

use serde::{Deserialize, Serialize};

/// When K codes take over a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovernanceMode {
    /// K governance starts at the first K code; earlier rows follow AP/AR/I
    #[default]
    Streaming,
    /// A category regulated by any K code in the method block is governed by
    /// K codes from its first row on
    Lookahead,
}

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// How K governance is established (default: streaming)
    #[serde(default)]
    pub governance: GovernanceMode,

    /// Flushing pressure (`I`) above which flushing counts as active (default: 0.1)
    #[serde(default = "default_flushing_threshold")]
    pub flushing_pressure_threshold: f64,

    /// Whether to keep non-fatal diagnostics on each method (default: true)
    #[serde(default = "default_true")]
    pub collect_diagnostics: bool,
}

fn default_flushing_threshold() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            governance: GovernanceMode::default(),
            flushing_pressure_threshold: default_flushing_threshold(),
            collect_diagnostics: default_true(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the governance mode
    pub fn with_governance(mut self, governance: GovernanceMode) -> Self {
        self.governance = governance;
        self
    }

    /// Builder method: set the flushing pressure threshold
    pub fn with_flushing_threshold(mut self, threshold: f64) -> Self {
        self.flushing_pressure_threshold = threshold;
        self
    }

    /// Builder method: enable or disable diagnostic collection
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.collect_diagnostics = enabled;
        self
    }
}
