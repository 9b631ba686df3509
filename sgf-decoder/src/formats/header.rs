//! Method header model
//!
//! Keeps the raw header fields of a method block and exposes the rig
//! metadata that downstream tools commonly need.

use crate::datetime::{parse_datetime, parse_time};
use crate::types::RawField;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sounding method of a block, from the `HM` code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MethodType {
    /// Cone penetration test
    Cpt,
    /// Rotary pressure sounding
    Rp,
    /// Total sounding
    Tot,
}

impl MethodType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "7" => Some(MethodType::Cpt),
            "23" => Some(MethodType::Rp),
            "24" => Some(MethodType::Tot),
            _ => None,
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodType::Cpt => write!(f, "CPT"),
            MethodType::Rp => write!(f, "RP"),
            MethodType::Tot => write!(f, "TOT"),
        }
    }
}

/// Header of one method block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub fields: Vec<RawField>,
}

impl Header {
    pub fn new(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// Value of a header field. Later lines override earlier ones.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.key == key)
            .map(|f| f.value.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value of the first of `keys` present in the header
    pub fn value_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.value(key))
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.number_of(&[key])
    }

    fn number_of(&self, keys: &[&str]) -> Option<f64> {
        let (key, value) = keys
            .iter()
            .find_map(|key| self.value(key).map(|value| (*key, value)))?;
        match value.parse::<f64>() {
            Ok(number) => Some(number),
            Err(_) => {
                log::debug!("Header field {}={:?} is not a number", key, value);
                None
            }
        }
    }

    /// Method type code (`HM`)
    pub fn method_code(&self) -> Option<&str> {
        self.value("HM")
    }

    /// Method type, when the `HM` code is a known one
    pub fn method_type(&self) -> Option<MethodType> {
        let code = self.method_code()?;
        let method_type = MethodType::from_code(code);
        if method_type.is_none() {
            log::debug!("Unknown method code HM={:?}", code);
        }
        method_type
    }

    /// Location name (`KP`)
    pub fn location_name(&self) -> Option<&str> {
        self.value("KP")
    }

    /// Project number (`HJ`)
    pub fn project_number(&self) -> Option<&str> {
        self.value("HJ")
    }

    /// Rig serial number (`HC`)
    pub fn serial_number(&self) -> Option<&str> {
        self.value("HC")
    }

    /// Operator (`HQ`)
    pub fn conducted_by(&self) -> Option<&str> {
        self.value("HQ")
    }

    /// Header remarks (`HT`)
    pub fn remarks(&self) -> Option<&str> {
        self.value("HT")
    }

    /// Cone reference (`HN`)
    pub fn cone_reference(&self) -> Option<&str> {
        self.value("HN")
    }

    /// Cone area ratio (`IE`, or `MA` in older files)
    pub fn cone_area_ratio(&self) -> Option<f64> {
        self.number_of(&["IE", "MA"])
    }

    /// Sleeve area ratio (`IF`, or `MB` in older files)
    pub fn sleeve_area_ratio(&self) -> Option<f64> {
        self.number_of(&["IF", "MB"])
    }

    /// Vane diameter (`IV`)
    pub fn vane_diameter(&self) -> Option<f64> {
        self.number("IV")
    }

    pub fn point_x(&self) -> Option<f64> {
        self.number("HX")
    }

    pub fn point_y(&self) -> Option<f64> {
        self.number("HY")
    }

    pub fn point_z(&self) -> Option<f64> {
        self.number("HZ")
    }

    /// Predrilling depth in metres (`HO`), zero when absent
    pub fn predrilling_depth(&self) -> f64 {
        self.number("HO").unwrap_or(0.0)
    }

    /// When the sounding was conducted
    ///
    /// The date comes from `HD`, or `KD` when `HD` is absent. A time of day in
    /// `HI` replaces the time part.
    pub fn conducted_at(&self) -> Option<NaiveDateTime> {
        let date = self.value("HD").or_else(|| self.value("KD"))?;
        let datetime = parse_datetime(date)?;

        match self.value("HI").and_then(parse_time) {
            Some(time) => Some(datetime.date().and_time(time)),
            None => Some(datetime),
        }
    }
}
