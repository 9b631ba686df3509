//! Code classification
//!
//! Maps raw `KEY=value` fields of a data row onto [`StatusEvent`]s for the
//! codes that regulate hammering and flushing:
//!
//! | Key  | Category  | Encoding                                   |
//! |------|-----------|--------------------------------------------|
//! | `K`  | both      | sub-code looked up in [`k_effects`]        |
//! | `AP` | hammering | `1` = on, `0` = off                        |
//! | `AR` | flushing  | `1` = on, `0` = off                        |
//! | `I`  | flushing  | pressure reading, compared by the tracker  |
//!
//! A K field may list several sub-codes (`K=73, 90`); each one is classified
//! in textual order.
//!
//! Every other key is ignored. Malformed values on recognised keys produce no
//! event; [`Classifier::classify_row`] records them as diagnostics instead.

use crate::types::{
    Category, DecoderError, Diagnostic, DiagnosticKind, RawField, Result, Source, StatusEvent,
    Toggle,
};

const FLUSHING_ON: &[(Category, Toggle)] = &[(Category::Flushing, Toggle::On)];
const FLUSHING_OFF: &[(Category, Toggle)] = &[(Category::Flushing, Toggle::Off)];
const HAMMERING_ON: &[(Category, Toggle)] = &[(Category::Hammering, Toggle::On)];
const HAMMERING_OFF: &[(Category, Toggle)] = &[(Category::Hammering, Toggle::Off)];
const BOTH_ON: &[(Category, Toggle)] = &[
    (Category::Hammering, Toggle::On),
    (Category::Flushing, Toggle::On),
];
const BOTH_OFF: &[(Category, Toggle)] = &[
    (Category::Hammering, Toggle::Off),
    (Category::Flushing, Toggle::Off),
];

/// Effect of a K sub-code on the regulated categories
///
/// Sub-codes outside 72-77 (including the terminal marker 90) affect neither
/// category.
pub fn k_effects(sub_code: u32) -> &'static [(Category, Toggle)] {
    match sub_code {
        72 => FLUSHING_ON,
        73 => FLUSHING_OFF,
        74 => HAMMERING_ON,
        75 => HAMMERING_OFF,
        76 => BOTH_ON,
        77 => BOTH_OFF,
        _ => &[],
    }
}

/// Stateless classifier for SGF status codes
pub struct Classifier;

impl Classifier {
    /// Classify a single field
    ///
    /// Returns an empty vector for keys that do not regulate hammering or
    /// flushing and for K sub-codes without an effect. A K code with a
    /// combined effect yields one event per category. A K value listing
    /// several sub-codes fails as a whole if any of them is malformed.
    pub fn classify(key: &str, value: &str) -> Result<Vec<StatusEvent>> {
        match key {
            "K" => {
                let pieces = Self::k_pieces(value);
                if pieces.is_empty() {
                    return Self::classify_k(value);
                }
                let mut events = Vec::new();
                for piece in pieces {
                    events.extend(Self::classify_k(piece)?);
                }
                Ok(events)
            }
            "AP" => {
                let toggle = Self::parse_switch(key, value)?;
                Ok(vec![StatusEvent::new(Category::Hammering, Source::AP, toggle)])
            }
            "AR" => {
                let toggle = Self::parse_switch(key, value)?;
                Ok(vec![StatusEvent::new(Category::Flushing, Source::AR, toggle)])
            }
            "I" => {
                let reading = Self::parse_number(key, value)?;
                Ok(vec![StatusEvent::new(
                    Category::Flushing,
                    Source::I,
                    Toggle::Reading(reading),
                )])
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Classify all fields of a data row, preserving textual order
    ///
    /// Malformed values are appended to `diagnostics` and skipped. Each
    /// sub-code of a K list is handled on its own, so one bad entry does not
    /// discard the others.
    pub fn classify_row(
        fields: &[RawField],
        line: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<StatusEvent> {
        let mut events = Vec::new();

        for field in fields {
            let pieces = match field.key.as_str() {
                "K" => Self::k_pieces(&field.value),
                _ => Vec::new(),
            };

            if pieces.len() > 1 {
                log::debug!("line {}: K list {:?}", line, field.value);
                for piece in pieces {
                    Self::collect(&field.key, piece, line, &mut events, diagnostics);
                }
            } else {
                Self::collect(&field.key, &field.value, line, &mut events, diagnostics);
            }
        }

        events
    }

    fn collect(
        key: &str,
        value: &str,
        line: usize,
        events: &mut Vec<StatusEvent>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        match Self::classify(key, value) {
            Ok(classified) => {
                for event in &classified {
                    log::trace!(
                        "line {}: {}={} -> {} {:?}",
                        line,
                        key,
                        value,
                        event.category,
                        event.toggle
                    );
                }
                events.extend(classified);
            }
            Err(e) => {
                log::debug!("line {}: ignoring field: {}", line, e);
                diagnostics.push(Diagnostic {
                    line,
                    key: key.to_string(),
                    value: value.to_string(),
                    kind: DiagnosticKind::MalformedValue,
                });
            }
        }
    }

    fn classify_k(value: &str) -> Result<Vec<StatusEvent>> {
        let sub_code = Self::parse_sub_code(value)?;
        Ok(k_effects(sub_code)
            .iter()
            .map(|&(category, toggle)| StatusEvent::new(category, Source::K, toggle))
            .collect())
    }

    /// Sub-codes of a K value, split on commas and whitespace
    fn k_pieces(value: &str) -> Vec<&str> {
        value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|piece| !piece.is_empty())
            .collect()
    }

    /// Parse a K sub-code
    ///
    /// Rigs occasionally write stray characters next to the digits, which are
    /// stripped before parsing.
    fn parse_sub_code(value: &str) -> Result<u32> {
        let trimmed = value.trim();
        if let Ok(code) = trimmed.parse::<u32>() {
            return Ok(code);
        }

        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        let code = digits.parse::<u32>().map_err(|_| DecoderError::InvalidValue {
            key: "K".to_string(),
            value: value.to_string(),
            reason: "no numeric sub-code".to_string(),
        })?;

        log::debug!("Normalized K sub-code {:?} to {}", value, code);
        Ok(code)
    }

    /// Parse an on/off flag (`1`/`0`, any other non-zero number counts as on)
    fn parse_switch(key: &str, value: &str) -> Result<Toggle> {
        match value.trim() {
            "1" => Ok(Toggle::On),
            "0" => Ok(Toggle::Off),
            _ => {
                let number = Self::parse_number(key, value)?;
                Ok(if number != 0.0 { Toggle::On } else { Toggle::Off })
            }
        }
    }

    fn parse_number(key: &str, value: &str) -> Result<f64> {
        let invalid = |reason: &str| DecoderError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let number = value
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("not a number"))?;

        if number.is_finite() {
            Ok(number)
        } else {
            Err(invalid("not a finite number"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(value: &str) -> Vec<(Category, Toggle)> {
        Classifier::classify("K", value)
            .unwrap()
            .into_iter()
            .map(|e| {
                assert_eq!(e.source, Source::K);
                (e.category, e.toggle)
            })
            .collect()
    }

    #[test]
    fn test_k_sub_code_table() {
        assert_eq!(k("72"), vec![(Category::Flushing, Toggle::On)]);
        assert_eq!(k("73"), vec![(Category::Flushing, Toggle::Off)]);
        assert_eq!(k("74"), vec![(Category::Hammering, Toggle::On)]);
        assert_eq!(k("75"), vec![(Category::Hammering, Toggle::Off)]);
    }

    #[test]
    fn test_combined_k_codes_affect_both_categories() {
        assert_eq!(
            k("76"),
            vec![
                (Category::Hammering, Toggle::On),
                (Category::Flushing, Toggle::On)
            ]
        );
        assert_eq!(
            k("77"),
            vec![
                (Category::Hammering, Toggle::Off),
                (Category::Flushing, Toggle::Off)
            ]
        );
    }

    #[test]
    fn test_k_codes_without_effect() {
        assert!(k("90").is_empty());
        assert!(k("41").is_empty());
        assert!(k("0").is_empty());
    }

    #[test]
    fn test_k_sub_code_with_stray_characters() {
        assert_eq!(k(" 74 "), vec![(Category::Hammering, Toggle::On)]);
        assert_eq!(k("72?"), vec![(Category::Flushing, Toggle::On)]);
        assert!(Classifier::classify("K", "abc").is_err());
        assert!(Classifier::classify("K", "").is_err());
    }

    #[test]
    fn test_k_value_listing_several_codes() {
        assert_eq!(k("73, 90"), vec![(Category::Flushing, Toggle::Off)]);
        assert_eq!(
            k("72,74"),
            vec![
                (Category::Flushing, Toggle::On),
                (Category::Hammering, Toggle::On)
            ]
        );
        assert_eq!(
            k("74 75"),
            vec![
                (Category::Hammering, Toggle::On),
                (Category::Hammering, Toggle::Off)
            ]
        );
        assert!(Classifier::classify("K", "72, ??").is_err());
    }

    #[test]
    fn test_classify_row_keeps_valid_codes_of_a_k_list() {
        let fields = vec![RawField::new("D", "4.0"), RawField::new("K", "72?, ab, 75")];
        let mut diagnostics = Vec::new();

        let events = Classifier::classify_row(&fields, 9, &mut diagnostics);

        assert_eq!(
            events,
            vec![
                StatusEvent::new(Category::Flushing, Source::K, Toggle::On),
                StatusEvent::new(Category::Hammering, Source::K, Toggle::Off),
            ]
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key, "K");
        assert_eq!(diagnostics[0].value, "ab");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedValue);
    }

    #[test]
    fn test_switch_codes() {
        let ap_on = Classifier::classify("AP", "1").unwrap();
        assert_eq!(
            ap_on,
            vec![StatusEvent::new(Category::Hammering, Source::AP, Toggle::On)]
        );

        let ar_off = Classifier::classify("AR", "0").unwrap();
        assert_eq!(
            ar_off,
            vec![StatusEvent::new(Category::Flushing, Source::AR, Toggle::Off)]
        );

        let ar_float = Classifier::classify("AR", "1.0").unwrap();
        assert_eq!(ar_float[0].toggle, Toggle::On);

        assert!(Classifier::classify("AP", "yes").is_err());
    }

    #[test]
    fn test_flushing_pressure_reading() {
        let events = Classifier::classify("I", "0.101").unwrap();
        assert_eq!(
            events,
            vec![StatusEvent::new(
                Category::Flushing,
                Source::I,
                Toggle::Reading(0.101)
            )]
        );

        assert!(Classifier::classify("I", "0,5").is_err());
        assert!(Classifier::classify("I", "NaN").is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        assert!(Classifier::classify("D", "1.0").unwrap().is_empty());
        assert!(Classifier::classify("B", "16.000").unwrap().is_empty());
        assert!(Classifier::classify("T", "Slag begynner").unwrap().is_empty());
        assert!(Classifier::classify("AZ", "garbage").unwrap().is_empty());
    }

    #[test]
    fn test_classify_row_preserves_order_and_collects_diagnostics() {
        let fields = vec![
            RawField::new("D", "3.0"),
            RawField::new("K", "74"),
            RawField::new("T", "Slag starter"),
            RawField::new("I", "x"),
            RawField::new("K", "73"),
        ];
        let mut diagnostics = Vec::new();

        let events = Classifier::classify_row(&fields, 3, &mut diagnostics);

        assert_eq!(
            events,
            vec![
                StatusEvent::new(Category::Hammering, Source::K, Toggle::On),
                StatusEvent::new(Category::Flushing, Source::K, Toggle::Off),
            ]
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 3);
        assert_eq!(diagnostics[0].key, "I");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedValue);
    }
}
