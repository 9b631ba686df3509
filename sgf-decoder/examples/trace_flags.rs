//! Print the hammering/flushing state of every row of an SGF log
//!
//! Usage:
//!   trace_flags <log_file.tot> [--lookahead]
//!
//! Rows where either flag changes are marked with `*`.

use sgf_decoder::{Decoder, DecoderConfig, GovernanceMode, RowFlags};
use std::env;
use std::path::PathBuf;

fn flag(value: bool) -> char {
    if value {
        'X'
    } else {
        '.'
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.iter().find(|a| !a.starts_with("--")).map(PathBuf::from) else {
        eprintln!("Usage: trace_flags <log_file.tot> [--lookahead]");
        std::process::exit(2);
    };

    let governance = if args.iter().any(|a| a == "--lookahead") {
        GovernanceMode::Lookahead
    } else {
        GovernanceMode::Streaming
    };

    let decoder = Decoder::new(DecoderConfig::new().with_governance(governance));
    let methods = match decoder.decode_file(&path) {
        Ok(methods) => methods,
        Err(e) => {
            eprintln!("Failed to decode {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    for (index, method) in methods.iter().enumerate() {
        println!(
            "=== Method {} (HM={}) - {} rows ===",
            index,
            method.header.method_code().unwrap_or("?"),
            method.rows.len()
        );
        println!("{:>9}  H  F  codes", "depth");

        let mut previous = RowFlags::default();
        for row in &method.rows {
            let codes: Vec<String> = row
                .fields
                .iter()
                .filter(|f| matches!(f.key.as_str(), "K" | "AP" | "AR" | "I"))
                .map(|f| format!("{}={}", f.key, f.value))
                .collect();
            let marker = if row.flags != previous { '*' } else { ' ' };

            println!(
                "{:>9.3}  {}  {}  {}{}",
                row.depth,
                flag(row.flags.hammering),
                flag(row.flags.flushing),
                marker,
                codes.join(",")
            );
            previous = row.flags;
        }

        for diagnostic in &method.diagnostics {
            println!("  ! {}", diagnostic);
        }
    }
}
