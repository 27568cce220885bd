//! Standalone signal log decoder tool
//!
//! Decodes a signal log and prints every resolved signal point by point,
//! followed by the per-signal summary.
//!
//! Usage:
//!   decode_signals <capture.txt> [--maximum <value>]
//!
//! Example:
//!   RUST_LOG=debug decode_signals capture.txt --maximum 1024

use signal_log_decoder::{Decoder, DecoderConfig};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <capture.txt> [--maximum <value>]", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut config = DecoderConfig::new();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--maximum" if i + 1 < args.len() => {
                match args[i + 1].parse::<f64>() {
                    Ok(maximum) => config = config.with_maximum(maximum),
                    Err(e) => {
                        eprintln!("Invalid --maximum '{}': {}", args[i + 1], e);
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    let decoded = match Decoder::new(config).decode_file(&path) {
        Ok(decoded) => decoded,
        Err(e) => {
            eprintln!("Failed to decode {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    for signal in &decoded.signals {
        println!("=== {} ===", signal.label);
        for (x, y) in signal.x.iter().zip(&signal.y) {
            println!("  {:>12.4}  {:>12.4}", x, y);
        }
    }

    println!("\nsignals:");
    for summary in decoded.summaries() {
        println!("{}", summary);
    }

    for e in &decoded.report.skipped {
        println!("skipped: {}", e);
    }
    let unlisted = decoded.report.skipped_lines - decoded.report.skipped.len();
    if unlisted > 0 {
        println!("... and {} more skipped line(s)", unlisted);
    }
    for (label, e) in &decoded.unresolved {
        println!("unresolved {}: {}", label, e);
    }
}
