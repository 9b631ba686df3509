//! Report generation
//!
//! Summarises decoded method blocks per input file, as plain text or JSON.

use anyhow::Result;
use serde::Serialize;
use sgf_decoder::{Method, MethodType};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Summary of one decoded method block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub index: usize,
    pub method_code: Option<String>,
    pub method_type: Option<MethodType>,
    pub conducted_at: Option<String>,
    pub rows: usize,
    pub depth_top: Option<f64>,
    pub depth_base: Option<f64>,
    pub hammering_rows: usize,
    pub flushing_rows: usize,
    pub diagnostics: usize,
}

impl MethodSummary {
    pub fn from_method(index: usize, method: &Method) -> Self {
        Self {
            index,
            method_code: method.header.method_code().map(str::to_string),
            method_type: method.header.method_type(),
            conducted_at: method.header.conducted_at().map(|t| t.to_string()),
            rows: method.rows.len(),
            depth_top: method.depth_top(),
            depth_base: method.depth_base(),
            hammering_rows: method.rows.iter().filter(|r| r.flags.hammering).count(),
            flushing_rows: method.rows.iter().filter(|r| r.flags.flushing).count(),
            diagnostics: method.diagnostics.len(),
        }
    }
}

/// Outcome of decoding one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub methods: Vec<MethodSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn decoded(file: &Path, methods: &[Method]) -> Self {
        Self {
            file: file.to_path_buf(),
            methods: methods
                .iter()
                .enumerate()
                .map(|(i, m)| MethodSummary::from_method(i, m))
                .collect(),
            error: None,
        }
    }

    pub fn failed(file: &Path, error: &anyhow::Error) -> Self {
        Self {
            file: file.to_path_buf(),
            methods: Vec::new(),
            error: Some(format!("{:#}", error)),
        }
    }
}

fn depth(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |d| format!("{:.2}", d))
}

/// Render reports as an ASCII table per file
pub fn render_txt(reports: &[FileReport]) -> Result<String> {
    let mut out = String::new();

    for report in reports {
        writeln!(out, "{}", report.file.display())?;

        if let Some(error) = &report.error {
            writeln!(out, "  error: {}", error)?;
            continue;
        }

        writeln!(
            out,
            "  {:>3}  {:<6} {:>6} {:>9} {:>9} {:>9} {:>9} {:>6}",
            "#", "method", "rows", "top (m)", "base (m)", "hammering", "flushing", "diag"
        )?;
        for m in &report.methods {
            let method = match (m.method_type, m.method_code.as_deref()) {
                (Some(method_type), _) => method_type.to_string(),
                (None, Some(code)) => code.to_string(),
                (None, None) => "?".to_string(),
            };
            writeln!(
                out,
                "  {:>3}  {:<6} {:>6} {:>9} {:>9} {:>9} {:>9} {:>6}",
                m.index,
                method,
                m.rows,
                depth(m.depth_top),
                depth(m.depth_base),
                m.hammering_rows,
                m.flushing_rows,
                m.diagnostics
            )?;
        }
    }

    Ok(out)
}

/// Render reports as pretty-printed JSON
pub fn render_json(reports: &[FileReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgf_decoder::Decoder;

    fn reports() -> Vec<FileReport> {
        let text = "$\r\nHM=24,HD=20200910\r\n#\r\nD=0.0,AP=1\r\nD=0.5,K=72\r\nD=1.0,K=77\r\n";
        let methods = Decoder::default().decode_str(text).unwrap();
        vec![
            FileReport::decoded(Path::new("a.tot"), &methods),
            FileReport::failed(Path::new("b.tot"), &anyhow::anyhow!("boom")),
        ]
    }

    #[test]
    fn test_method_summary() {
        let reports = reports();
        let summary = &reports[0].methods[0];

        assert_eq!(summary.method_code.as_deref(), Some("24"));
        assert_eq!(summary.method_type, Some(MethodType::Tot));
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.depth_top, Some(0.0));
        assert_eq!(summary.depth_base, Some(1.0));
        assert_eq!(summary.hammering_rows, 2);
        assert_eq!(summary.flushing_rows, 1);
        assert_eq!(summary.diagnostics, 0);
    }

    #[test]
    fn test_render_txt() {
        let txt = render_txt(&reports()).unwrap();
        assert!(txt.contains("a.tot"));
        assert!(txt.contains("TOT"));
        assert!(txt.contains("hammering"));
        assert!(txt.contains("1.00"));
        assert!(txt.contains("error: boom"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&reports()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["methods"][0]["rows"], 3);
        assert_eq!(value[0]["methods"][0]["method_type"], "TOT");
        assert_eq!(value[0]["methods"][0]["flushing_rows"], 1);
        assert!(value[0].get("error").is_none());
        assert_eq!(value[1]["error"], "boom");
    }
}
