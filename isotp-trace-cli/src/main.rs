//! ISO-TP Trace Decoder CLI Application
//!
//! This is the command-line interface for the isotp-trace-decoder library.
//! It adds the process concerns the library stays out of:
//! - Argument parsing and an optional TOML configuration file
//! - Logging initialization
//! - Text or JSON-lines output, to stdout or a file

use anyhow::{Context, Result};
use clap::Parser;
use isotp_trace_decoder::{DecodedRecord, Decoder, DecoderConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;

/// ISO-TP Trace Decoder - reassemble ISO-TP messages from a CAN trace
#[derive(Parser, Debug)]
#[command(name = "isotp-trace-cli")]
#[command(about = "Decode ISO-TP (ISO 15765-2) messages from a hex CAN trace", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the trace file to decode
    #[arg(value_name = "TRACE")]
    trace: Option<PathBuf>,

    /// Output file for decoded records (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only decode these CAN identifiers (hex, can be repeated)
    #[arg(long = "id", value_name = "HEX", value_parser = parse_can_id)]
    ids: Vec<u32>,

    /// Decode identifier groups sequentially instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Emit one JSON object per record instead of plain text
    #[arg(long)]
    json: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Effective settings for one decoding run, from flags or a config file
struct RunSettings {
    trace: PathBuf,
    ids: Vec<u32>,
    output: Option<PathBuf>,
    json: bool,
    sequential: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("ISO-TP Trace Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", isotp_trace_decoder::VERSION);

    if let Some(trace) = &args.trace {
        // Flags mode - everything comes from the command line
        let settings = RunSettings {
            trace: trace.clone(),
            ids: args.ids.clone(),
            output: args.output.clone(),
            json: args.json,
            sequential: args.sequential,
        };
        run(&settings)?;
    } else if let Some(config_path) = &args.config {
        // Config mode - everything comes from the TOML file
        run(&config_mode_settings(config_path)?)?;
    } else {
        // No arguments - show help
        println!("ISO-TP Trace Decoder - no input specified");
        println!("\nQuick Start:");
        println!("  isotp-trace-cli bus.trace");
        println!("  isotp-trace-cli bus.trace --id 0x700 --id 0x7E8 --json");
        println!("\nWith a configuration file:");
        println!("  isotp-trace-cli --config config.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Load the TOML configuration and turn it into run settings
fn config_mode_settings(config_path: &Path) -> Result<RunSettings> {
    log::info!("Loading configuration from: {:?}", config_path);
    let app_config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    Ok(RunSettings {
        trace: app_config.input.trace,
        ids: app_config.input.ids,
        output: app_config.output.file,
        json: app_config.output.json,
        sequential: app_config.decode.sequential,
    })
}

/// Decode the trace and write the records out
fn run(settings: &RunSettings) -> Result<()> {
    let mut decoder_config = DecoderConfig::new().with_parallel(!settings.sequential);
    if !settings.ids.is_empty() {
        decoder_config = decoder_config.with_id_filter(settings.ids.clone());
    }

    let decoder = Decoder::with_config(decoder_config);
    let records = decoder
        .decode_file(&settings.trace)
        .with_context(|| format!("Failed to decode trace file: {:?}", settings.trace))?;

    log::info!("Decoded {} record(s)", records.len());

    match &settings.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_records(BufWriter::new(file), &records, settings.json)?;
            log::info!("Records written to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            write_records(stdout.lock(), &records, settings.json)?;
        }
    }

    Ok(())
}

/// Serialized form of a record for JSON-lines output
#[derive(serde::Serialize)]
struct JsonRecord {
    index: usize,
    id: String,
    text: String,
}

/// Write one line per record, plain text or JSON
fn write_records<W: Write>(mut writer: W, records: &[DecodedRecord], json: bool) -> Result<()> {
    for record in records {
        if json {
            let json_record = JsonRecord {
                index: record.index(),
                id: format!("{:x}", record.can_id()),
                text: record.text(),
            };
            serde_json::to_writer(&mut writer, &json_record)?;
            writeln!(writer)?;
        } else {
            writeln!(writer, "{}", record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Parse a CAN identifier given as hex, with or without a 0x prefix
fn parse_can_id(value: &str) -> Result<u32, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16)
        .map_err(|e| format!("invalid CAN identifier {:?}: {}", value, e))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
