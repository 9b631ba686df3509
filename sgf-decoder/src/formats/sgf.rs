//! SGF text tokenizer
//!
//! Splits an SGF sounding log into method blocks. The layout is line based:
//!
//! ```text
//! $                                  <- opens a method block (header section)
//! HA=1,HB=1122,HD=20200910,HI=1343   <- header fields, may span several lines
//! #                                  <- switches to the data section
//! D=0.0,B=16.000                     <- one data row per line
//! D=1.0,K=72,T=Spyling begynner
//! ```
//!
//! Lines are split on `,` into `KEY=value` fields. A segment without `=`
//! continues the previous field's value, so free text containing commas
//! survives. Duplicate keys are kept in order.

use crate::types::{DecoderError, RawField, Result};

/// Section of a method block a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Data,
}

/// A data line of a method block, split into fields
#[derive(Debug, Clone, PartialEq)]
pub struct DataLine {
    /// 1-based line number in the source text
    pub line_number: usize,
    pub fields: Vec<RawField>,
}

/// One `$ ... # ...` block of an SGF file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodBlock {
    /// Header fields of all header lines, in order
    pub header: Vec<RawField>,
    pub data: Vec<DataLine>,
}

/// SGF tokenizer entry point
pub struct SgfParser;

impl SgfParser {
    /// Iterate over the method blocks of an SGF text, line by line
    pub fn blocks<I>(lines: I) -> MethodBlockIterator<I>
    where
        I: Iterator<Item = std::io::Result<String>>,
    {
        MethodBlockIterator {
            lines,
            line_number: 0,
            current: None,
            section: Section::Header,
            finished: false,
        }
    }

    /// Tokenize a complete SGF text
    pub fn parse_str(text: &str) -> Result<Vec<MethodBlock>> {
        Self::blocks(text.lines().map(|l| Ok::<_, std::io::Error>(l.to_string()))).collect()
    }

    /// Split one line into its `KEY=value` fields
    pub fn split_fields(line: &str) -> Vec<RawField> {
        let mut fields: Vec<RawField> = Vec::new();

        for segment in line.split(',') {
            match segment.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim();
                    if key.is_empty() {
                        log::debug!("Skipping field without key: {:?}", segment);
                        continue;
                    }
                    fields.push(RawField::new(key, value.trim_end()));
                }
                None if segment.trim().is_empty() => {}
                None => match fields.last_mut() {
                    Some(previous) => {
                        previous.value.push(',');
                        previous.value.push_str(segment.trim_end());
                    }
                    None => log::debug!("Skipping stray text: {:?}", segment),
                },
            }
        }

        fields
    }
}

/// Iterator over method blocks, built by [`SgfParser::blocks`]
pub struct MethodBlockIterator<I> {
    lines: I,
    line_number: usize,
    current: Option<MethodBlock>,
    section: Section,
    finished: bool,
}

impl<I> MethodBlockIterator<I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    /// Feed one line. Returns a completed block when `line` opens the next one.
    fn process_line(&mut self, line: &str) -> Result<Option<MethodBlock>> {
        let line = line.trim_end_matches('\r').trim();
        // `€` noise lines, also as read from a Windows-1252 file through Latin-1
        if line.is_empty() || line == "€" || line == "\u{80}" {
            return Ok(None);
        }

        if let Some(rest) = line.strip_prefix('$') {
            let completed = self.current.replace(MethodBlock::default());
            self.section = Section::Header;
            self.push_fields(rest)?;
            return Ok(completed);
        }

        if let Some(rest) = line.strip_prefix('#') {
            if self.current.is_none() {
                return Err(self.error("data marker before method header"));
            }
            self.section = Section::Data;
            self.push_fields(rest)?;
            return Ok(None);
        }

        self.push_fields(line)?;
        Ok(None)
    }

    fn push_fields(&mut self, text: &str) -> Result<()> {
        let fields = Self::fields_of(text);
        if fields.is_empty() {
            return Ok(());
        }

        let line_number = self.line_number;
        let section = self.section;
        let Some(block) = self.current.as_mut() else {
            return Err(DecoderError::LogParseError(format!(
                "line {}: fields before method header",
                line_number
            )));
        };

        match section {
            Section::Header => block.header.extend(fields),
            Section::Data => block.data.push(DataLine {
                line_number,
                fields,
            }),
        }
        Ok(())
    }

    fn fields_of(text: &str) -> Vec<RawField> {
        if text.trim().is_empty() {
            Vec::new()
        } else {
            SgfParser::split_fields(text)
        }
    }

    fn error(&self, what: &str) -> DecoderError {
        DecoderError::LogParseError(format!("line {}: {}", self.line_number, what))
    }
}

impl<I> Iterator for MethodBlockIterator<I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    type Item = Result<MethodBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finished = true;
                    return self.current.take().map(Ok);
                }
            };
            self.line_number += 1;

            match self.process_line(&line) {
                Ok(Some(block)) => return Some(Ok(block)),
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        let fields = SgfParser::split_fields("D=1.0,B=16.000,K=72,T=Spyling begynner");
        assert_eq!(
            fields,
            vec![
                RawField::new("D", "1.0"),
                RawField::new("B", "16.000"),
                RawField::new("K", "72"),
                RawField::new("T", "Spyling begynner"),
            ]
        );
    }

    #[test]
    fn test_split_fields_keeps_duplicates_and_commas_in_text() {
        let fields =
            SgfParser::split_fields("D=2.0,K=75,T=Slag slutter, Spyling slutter,K=73,");
        assert_eq!(
            fields,
            vec![
                RawField::new("D", "2.0"),
                RawField::new("K", "75"),
                RawField::new("T", "Slag slutter, Spyling slutter"),
                RawField::new("K", "73"),
            ]
        );
    }

    #[test]
    fn test_split_fields_value_with_equals_sign() {
        let fields = SgfParser::split_fields("T=a=b");
        assert_eq!(fields, vec![RawField::new("T", "a=b")]);
    }

    #[test]
    fn test_single_method_block() {
        let text = "$\r\nHA=1,HM=24\r\nHD=20200910\r\n#\r\nD=0.0,B=16.000\r\nD=1.0,AP=1\r\n";
        let blocks = SgfParser::parse_str(text).unwrap();

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.header.len(), 3);
        assert_eq!(block.header[2], RawField::new("HD", "20200910"));
        assert_eq!(block.data.len(), 2);
        assert_eq!(block.data[0].line_number, 5);
        assert_eq!(block.data[1].fields[1], RawField::new("AP", "1"));
    }

    #[test]
    fn test_multiple_method_blocks() {
        let text = "$\nHM=24\n#\nD=0.0\nD=0.1\n$\nHM=7\n#\nD=5.0\n€\n";
        let blocks = SgfParser::parse_str(text).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].data.len(), 2);
        assert_eq!(blocks[1].header, vec![RawField::new("HM", "7")]);
        assert_eq!(blocks[1].data.len(), 1);
    }

    #[test]
    fn test_euro_noise_lines_are_skipped() {
        let text = "$\nHM=24\n\u{80}\n#\nD=0.0\n\u{80}\nD=0.1\n€\n";
        let blocks = SgfParser::parse_str(text).unwrap();

        assert_eq!(blocks[0].header, vec![RawField::new("HM", "24")]);
        assert_eq!(blocks[0].data.len(), 2);
        assert_eq!(blocks[0].data[1].line_number, 7);
    }

    #[test]
    fn test_fields_before_header_are_rejected() {
        let result = SgfParser::parse_str("D=0.0,B=1\n$\n#\n");
        assert!(matches!(result, Err(DecoderError::LogParseError(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(SgfParser::parse_str("").unwrap().is_empty());
        assert!(SgfParser::parse_str("\r\n\r\n").unwrap().is_empty());
    }
}
