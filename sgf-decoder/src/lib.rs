//! SGF Sounding Log Decoder Library
//!
//! A reusable library for decoding geotechnical sounding logs written in the
//! SGF text format and deriving the rig's hammering and flushing state for
//! every measured depth.
//!
//! # Architecture
//!
//! - The SGF tokenizer splits a log into method blocks (header + data rows)
//! - The classifier maps the status codes of each row (`K`, `AP`, `AR`, `I`)
//!   onto status events
//! - The state tracker folds those events row by row, applying the priority
//!   rules (K codes outrank AP/AR, which outrank the I reading), and attaches
//!   the resolved flags to each row
//!
//! The library does NOT:
//! - Interpret comment codes other than the hammering/flushing transitions
//! - Persist or render decoded results
//!
//! Reporting is in the application layer (sgf-cli).
//!
//! # Example Usage
//!
//! ```
//! use sgf_decoder::{Decoder, DecoderConfig};
//!
//! let text = "$\r\nHM=24,HD=20200910\r\n#\r\nD=0.0,AP=1\r\nD=0.1,K=72\r\nD=0.2,K=75\r\n";
//!
//! let decoder = Decoder::new(DecoderConfig::new());
//! let methods = decoder.decode_str(text).unwrap();
//!
//! assert_eq!(methods[0].hammering_flags(), vec![true, true, false]);
//! assert_eq!(methods[0].flushing_flags(), vec![false, true, true]);
//! ```

// Public modules
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod formats;
pub mod tracker;
pub mod types;

// Re-export main types for convenience
pub use classifier::{k_effects, Classifier};
pub use config::{DecoderConfig, GovernanceMode};
pub use decoder::{Decoder, DecodingIterator, Method};
pub use formats::{Header, MethodType};
pub use tracker::{RegulatorState, StateTracker};
pub use types::{
    Category, DataRow, DecoderError, Diagnostic, DiagnosticKind, RawField, Result, RowFlags,
    Source, StatusEvent, Toggle,
};

// Internal modules (not exposed in public API)
mod datetime;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty log decodes to no methods
        let decoder = Decoder::default();
        let methods = decoder.decode_str("").unwrap();
        assert!(methods.is_empty());
    }
}
