//! Standalone ISO-TP trace decoder tool
//!
//! Decodes a hex trace file and prints one line per reassembled message or
//! observed flow-control frame, in the original trace order.
//!
//! Usage:
//!   decode_trace <trace_file> [--sequential] [--limit <count>]
//!
//! Example:
//!   decode_trace bus.trace --limit 100

use isotp_trace_decoder::{DecodedRecord, Decoder, DecoderConfig};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

struct DecodeStats {
    messages: usize,
    flow_controls: usize,
    unique_can_ids: HashMap<u32, usize>,
}

impl DecodeStats {
    fn new() -> Self {
        Self {
            messages: 0,
            flow_controls: 0,
            unique_can_ids: HashMap::new(),
        }
    }

    fn record(&mut self, record: &DecodedRecord) {
        match record {
            DecodedRecord::Message { .. } => self.messages += 1,
            DecodedRecord::FlowControl { .. } => self.flow_controls += 1,
        }
        *self.unique_can_ids.entry(record.can_id()).or_insert(0) += 1;
    }

    fn print_summary(&self) {
        println!("\n=== DECODING SUMMARY ===");
        println!("Messages: {}", self.messages);
        println!("Flow control frames: {}", self.flow_controls);
        println!("Unique CAN IDs seen: {}", self.unique_can_ids.len());

        if !self.unique_can_ids.is_empty() {
            println!("\nRecords per CAN ID:");
            let mut sorted: Vec<_> = self.unique_can_ids.iter().collect();
            sorted.sort();
            for (can_id, count) in sorted {
                println!("  {:03x}: {} records", can_id, count);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls decoder logging (e.g. RUST_LOG=debug)
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <trace_file> [--sequential] [--limit <count>]",
            args[0]
        );
        eprintln!("\nExample:");
        eprintln!("  {} bus.trace --limit 100", args[0]);
        std::process::exit(1);
    }

    let trace_file = PathBuf::from(&args[1]);
    let mut sequential = false;
    let mut limit: Option<usize> = None;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--sequential" => {
                sequential = true;
            }
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    println!("=== ISO-TP Trace Decoder ===");
    println!("Trace file: {:?}", trace_file);
    println!("Mode: {}", if sequential { "sequential" } else { "parallel" });
    println!();

    let config = DecoderConfig::new().with_parallel(!sequential);
    let decoder = Decoder::with_config(config);
    let records = decoder.decode_file(&trace_file)?;

    let shown = limit.unwrap_or(records.len()).min(records.len());
    for record in &records[..shown] {
        println!("{}", record);
    }
    if shown < records.len() {
        println!("... ({} more records)", records.len() - shown);
    }

    let mut stats = DecodeStats::new();
    for record in &records {
        stats.record(record);
    }
    stats.print_summary();

    Ok(())
}
