//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The [`Decoder`] turns SGF text into [`Method`]s whose rows carry the
//! resolved hammering and flushing flags.

use crate::classifier::Classifier;
use crate::config::{DecoderConfig, GovernanceMode};
use crate::formats::{Header, MethodBlock, MethodBlockIterator, SgfParser};
use crate::tracker::StateTracker;
use crate::types::{
    Category, DataRow, Diagnostic, DiagnosticKind, RawField, Result, RowFlags, Source,
    StatusEvent,
};
use std::io::BufRead;
use std::path::Path;

/// A decoded method block
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub header: Header,
    /// One entry per data row with a usable depth, in source order
    pub rows: Vec<DataRow>,
    /// Non-fatal problems found in this block
    pub diagnostics: Vec<Diagnostic>,
}

impl Method {
    /// Smallest depth of all rows
    pub fn depth_top(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.depth).reduce(f64::min)
    }

    /// Largest depth of all rows
    pub fn depth_base(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.depth).reduce(f64::max)
    }

    pub fn row_flags(&self) -> Vec<RowFlags> {
        self.rows.iter().map(|r| r.flags).collect()
    }

    pub fn hammering_flags(&self) -> Vec<bool> {
        self.rows.iter().map(|r| r.flags.hammering).collect()
    }

    pub fn flushing_flags(&self) -> Vec<bool> {
        self.rows.iter().map(|r| r.flags.flushing).collect()
    }
}

/// The main decoder struct - entry point for all decoding operations
///
/// A decoder holds configuration only. Every method block is decoded with a
/// fresh [`StateTracker`], so one decoder can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a new decoder instance
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode an SGF file
    ///
    /// Files that are not valid UTF-8 are read as Latin-1. For Windows-1252
    /// output this is exact outside 0x80-0x9F; bytes in that range become C1
    /// control characters (a `€` noise line reads as U+0080 and is skipped).
    ///
    /// # Example
    /// ```no_run
    /// use sgf_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new(DecoderConfig::new());
    /// let methods = decoder.decode_file(Path::new("borehole.tot")).unwrap();
    ///
    /// for method in methods {
    ///     println!("{} rows, hammering: {:?}", method.rows.len(), method.hammering_flags());
    /// }
    /// ```
    pub fn decode_file(&self, path: &Path) -> Result<Vec<Method>> {
        log::info!("Decoding SGF file: {:?}", path);

        let bytes = std::fs::read(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("SGF file {:?} is not UTF-8, reading as Latin-1", path);
                e.into_bytes().iter().map(|&b| b as char).collect()
            }
        };

        let methods = self.decode_str(&text)?;
        log::info!("Decoded {} method block(s) from {:?}", methods.len(), path);
        Ok(methods)
    }

    /// Decode SGF text held in memory
    pub fn decode_str(&self, text: &str) -> Result<Vec<Method>> {
        self.decode_lines(text.lines().map(|l| Ok::<_, std::io::Error>(l.to_string())))
            .collect()
    }

    /// Decode SGF text from a reader, one method block at a time
    pub fn decode_reader<R: BufRead>(
        &self,
        reader: R,
    ) -> DecodingIterator<'_, std::io::Lines<R>> {
        self.decode_lines(reader.lines())
    }

    fn decode_lines<I>(&self, lines: I) -> DecodingIterator<'_, I>
    where
        I: Iterator<Item = std::io::Result<String>>,
    {
        DecodingIterator {
            blocks: SgfParser::blocks(lines),
            decoder: self,
            index: 0,
        }
    }

    /// Decode one tokenized method block
    pub fn decode_block(&self, block: MethodBlock) -> Method {
        let header = Header::new(block.header);
        let mut diagnostics = Vec::new();

        let events: Vec<Vec<StatusEvent>> = block
            .data
            .iter()
            .map(|line| Classifier::classify_row(&line.fields, line.line_number, &mut diagnostics))
            .collect();

        let mut tracker = StateTracker::from_config(&self.config);
        if self.config.governance == GovernanceMode::Lookahead {
            for category in Category::ALL {
                let regulated_by_k = events
                    .iter()
                    .flatten()
                    .any(|e| e.category == category && e.source == Source::K);
                if regulated_by_k {
                    tracker.govern_by_k(category);
                }
            }
        }

        let mut rows = Vec::with_capacity(block.data.len());
        for (line, row_events) in block.data.into_iter().zip(events) {
            let flags = tracker.apply_row(&row_events);

            match Self::depth_of(&line.fields) {
                Some(depth) => rows.push(DataRow {
                    depth,
                    fields: line.fields,
                    flags,
                }),
                None => {
                    log::warn!(
                        "line {}: data row without a usable depth, skipping",
                        line.line_number
                    );
                    diagnostics.push(Diagnostic {
                        line: line.line_number,
                        key: "D".to_string(),
                        value: Self::raw_depth(&line.fields).unwrap_or_default().to_string(),
                        kind: DiagnosticKind::MissingDepth,
                    });
                }
            }
        }

        if !self.config.collect_diagnostics {
            diagnostics.clear();
        }

        Method {
            header,
            rows,
            diagnostics,
        }
    }

    fn raw_depth(fields: &[RawField]) -> Option<&str> {
        fields.iter().find(|f| f.key == "D").map(|f| f.value.as_str())
    }

    fn depth_of(fields: &[RawField]) -> Option<f64> {
        Self::raw_depth(fields)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
    }
}

/// Iterator that decodes method blocks as they are tokenized
pub struct DecodingIterator<'a, I> {
    blocks: MethodBlockIterator<I>,
    decoder: &'a Decoder,
    index: usize,
}

impl<'a, I> Iterator for DecodingIterator<'a, I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    type Item = Result<Method>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = match self.blocks.next()? {
            Ok(block) => block,
            Err(e) => return Some(Err(e)),
        };

        let method = self.decoder.decode_block(block);
        log::debug!(
            "Method block {} (HM={}): {} rows, {} diagnostics",
            self.index,
            method.header.method_code().unwrap_or("?"),
            method.rows.len(),
            method.diagnostics.len()
        );
        self.index += 1;

        Some(Ok(method))
    }
}
