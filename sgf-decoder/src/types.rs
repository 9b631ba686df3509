//! Core types for the SGF decoder library
//!
//! This module defines the fundamental types flowing between the classifier,
//! the state tracker and the decoder: classified status events, the per-row
//! flag pair, decoded rows and the non-fatal diagnostics collected on the way.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur during decoding
///
/// Problems with individual codes never surface here; they are recorded as
/// [`Diagnostic`]s and the parse continues.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Operating state regulated by the rig's status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hammering,
    Flushing,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Hammering, Category::Flushing];

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Hammering => 0,
            Category::Flushing => 1,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Hammering => write!(f, "hammering"),
            Category::Flushing => write!(f, "flushing"),
        }
    }
}

/// Code a status event originates from
///
/// Override order is given by [`Source::rank`]: a K code outranks AP/AR,
/// which outrank the I reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Flushing pressure reading
    I,
    /// Hammering on/off flag
    AP,
    /// Flushing on/off flag
    AR,
    /// Comment code with an explicit hammering/flushing transition
    K,
}

impl Source {
    /// Priority tier of this source within its category
    ///
    /// AP and AR never compete (they regulate different categories), so they
    /// share the secondary tier.
    pub fn rank(self) -> u8 {
        match self {
            Source::I => 0,
            Source::AP | Source::AR => 1,
            Source::K => 2,
        }
    }

    /// The code key as written in an SGF data row
    pub fn key(self) -> &'static str {
        match self {
            Source::I => "I",
            Source::AP => "AP",
            Source::AR => "AR",
            Source::K => "K",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What a status event says about its category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Toggle {
    On,
    Off,
    /// Numeric reading, compared against a threshold by the tracker
    Reading(f64),
}

impl Toggle {
    /// Resolve to an on/off state, using `threshold` for readings
    pub fn is_active(self, threshold: f64) -> bool {
        match self {
            Toggle::On => true,
            Toggle::Off => false,
            Toggle::Reading(value) => value > threshold,
        }
    }
}

/// A classified code occurrence
///
/// Created per code token and consumed immediately by the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEvent {
    pub category: Category,
    pub source: Source,
    pub toggle: Toggle,
}

impl StatusEvent {
    pub fn new(category: Category, source: Source, toggle: Toggle) -> Self {
        Self {
            category,
            source,
            toggle,
        }
    }
}

/// Resolved operating flags for one data row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowFlags {
    pub hammering: bool,
    pub flushing: bool,
}

impl RowFlags {
    /// Flag value for a single category
    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Hammering => self.hammering,
            Category::Flushing => self.flushing,
        }
    }
}

/// A raw `KEY=value` field as it appears in an SGF line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub key: String,
    pub value: String,
}

impl RawField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One decoded measurement row of a method block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    /// Depth in metres (`D` field)
    pub depth: f64,
    /// Every field of the row in textual order, including `D`
    pub fields: Vec<RawField>,
    /// Operating flags resolved after all codes of the row were applied
    pub flags: RowFlags,
}

impl DataRow {
    /// First value recorded for `key` on this row
    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// All values recorded for `key` on this row, in textual order
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.key == key)
            .map(|f| f.value.as_str())
    }
    /// First value of `key` read as a number
    pub fn number(&self, key: &str) -> Option<f64> {
        self.value(key)?.trim().parse::<f64>().ok()
    }

    /// Penetration force in kN (`A`)
    pub fn penetration_force(&self) -> Option<f64> {
        self.number("A")
    }

    /// Penetration rate in mm/s (`B`)
    pub fn penetration_rate(&self) -> Option<f64> {
        self.number("B")
    }

    /// Hammering pressure (`AZ`)
    pub fn hammering_pressure(&self) -> Option<f64> {
        self.number("AZ")
    }

    /// Flushing pressure (`I`)
    pub fn flushing_pressure(&self) -> Option<f64> {
        self.number("I")
    }

    /// Flushing flow (`J`)
    pub fn flushing_flow(&self) -> Option<f64> {
        self.number("J")
    }

    /// Engine pressure (`P`)
    pub fn engine_pressure(&self) -> Option<f64> {
        self.number("P")
    }

    /// Rotation rate (`R`)
    pub fn rotation_rate(&self) -> Option<f64> {
        self.number("R")
    }

    /// Torque (`V`)
    pub fn torque(&self) -> Option<f64> {
        self.number("V")
    }

    /// Free-text remarks (`T`), joined with `, ` when the row has several
    pub fn remarks(&self) -> Option<String> {
        let remarks: Vec<&str> = self
            .values("T")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if remarks.is_empty() {
            None
        } else {
            Some(remarks.join(", "))
        }
    }
}

/// Why a field or row was set aside during decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A recognised code carried a value that is not a number
    MalformedValue,
    /// A data row without a usable `D` field
    MissingDepth,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MalformedValue => write!(f, "malformed value"),
            DiagnosticKind::MissingDepth => write!(f, "missing depth"),
        }
    }
}

/// A non-fatal problem found while decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number in the source text
    pub line: usize,
    pub key: String,
    pub value: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} for {}={:?}",
            self.line, self.kind, self.key, self.value
        )
    }
}
