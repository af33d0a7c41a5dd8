//! ISO-TP Trace Decoder Library
//!
//! A stateless, reusable library for decoding recorded CAN bus traces into
//! reassembled ISO-TP (ISO 15765-2) application messages.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Parses the 19-character hex trace format (3-digit CAN identifier plus
//!   8 payload bytes per line)
//! - Partitions the trace by identifier and reassembles each identifier's
//!   multi-frame messages independently, one worker per identifier
//! - Reports observed flow-control frames
//! - Merges all records back into the original trace order
//!
//! The library does NOT:
//! - Talk to a CAN bus or pace transfers (it is a passive, offline decoder)
//! - Handle extended addressing, CAN FD payload sizes, or escape-length
//!   First Frames
//! - Track more than one in-flight assembly per identifier
//! - Write output anywhere (formatting and I/O live in the application layer)
//!
//! All higher-level functionality is in the application layer
//! (isotp-trace-cli).
//!
//! # Example Usage
//!
//! ```
//! use isotp_trace_decoder::{Decoder, DecoderConfig};
//!
//! let decoder = Decoder::with_config(DecoderConfig::new().with_parallel(true));
//! let records = decoder.decode_lines([
//!     "700100A112233445566", // first frame: 10 bytes declared
//!     "7DF02AABBCC00000000", // single frame on another identifier
//!     "70021778899AABBCCDD", // consecutive frame completes the message
//! ]);
//!
//! for record in &records {
//!     println!("{}", record);
//! }
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].to_string(), "7df: aabb");
//! assert_eq!(records[1].to_string(), "700: 112233445566778899aa");
//! ```

// Public modules
pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod isotp;
pub mod trace;
pub mod types;

// Re-export main types for convenience
pub use aggregator::RecordCollector;
pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use isotp::{IsotpFrame, ReassemblySession};
pub use trace::TraceParser;
pub use types::{DecodedRecord, DecoderError, FlowStatus, Result, TraceLine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
