//! SGF text format handling
//!
//! Tokenizes SGF sounding logs into method blocks and models their headers.
//! The decoder feeds the data lines of each block through the classifier and
//! the state tracker.

pub mod header;
pub mod sgf;

// Re-export format types
pub use header::{Header, MethodType};
pub use sgf::{DataLine, MethodBlock, MethodBlockIterator, SgfParser};
