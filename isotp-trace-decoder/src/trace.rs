//! Trace file parsing and identifier partitioning
//!
//! Parses the line-oriented hex trace format: one classic CAN frame per line,
//! exactly 19 hex characters - a 3-digit CAN identifier immediately followed
//! by 16 digits encoding the 8 payload bytes.
//!
//! ```text
//! 7DF02AABBCC00000000
//! ^^^ identifier, then 16 payload digits
//! ```
//!
//! Lines of any other shape are noise, not errors: they are skipped without
//! consuming an index slot, so the indices of valid lines are unaffected by
//! junk in between. This is a best-effort decoder over legacy logs.

use crate::types::{DecoderError, Result, TraceLine};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Total line length: identifier digits + payload digits
const LINE_LEN: usize = 19;
/// Hex digits forming the CAN identifier
const ID_DIGITS: usize = 3;

/// Trace file parser for the 19-character hex line format
pub struct TraceParser;

impl TraceParser {
    /// Parse a trace file into validated trace lines
    ///
    /// Opens the file and validates every line. Returns the accepted lines
    /// with their indices assigned in accepted-line order. Failure to open
    /// or read the file is the only error; malformed lines are skipped.
    pub fn parse_file(path: &Path) -> Result<Vec<TraceLine>> {
        log::info!("Parsing trace file: {:?}", path);

        if !path.exists() {
            return Err(DecoderError::TraceNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let lines = Self::parse_reader(BufReader::new(file))?;

        log::info!("Accepted {} trace lines from {:?}", lines.len(), path);
        Ok(lines)
    }

    /// Parse trace lines from any buffered reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<TraceLine>> {
        let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
        Ok(Self::parse_lines(&lines))
    }

    /// Parse an in-memory sequence of lines (infallible)
    ///
    /// Assigns the monotonically increasing `index` only to lines that pass
    /// validation; rejected lines leave no gap. A single trailing `'\r'` is
    /// stripped first so CRLF traces decode the same as LF traces.
    pub fn parse_lines<I, S>(lines: I) -> Vec<TraceLine>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            let line = line.as_ref();
            let line = line.strip_suffix('\r').unwrap_or(line);

            match Self::parse_line(line) {
                Some((can_id, payload)) => {
                    accepted.push(TraceLine {
                        index: accepted.len(),
                        can_id,
                        payload,
                    });
                }
                None => {
                    if !line.is_empty() {
                        skipped += 1;
                        log::trace!("Skipping malformed trace line: {:?}", line);
                    }
                }
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} malformed trace lines", skipped);
        }
        accepted
    }

    /// Validate and decode a single raw line
    ///
    /// Accepts only lines of exactly 19 ASCII hex digits and returns the CAN
    /// identifier plus the 8 payload bytes. Anything else (wrong length,
    /// non-hex characters) yields `None`.
    pub fn parse_line(line: &str) -> Option<(u32, [u8; 8])> {
        if line.len() != LINE_LEN || !line.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        // All-hex means all-ASCII, so byte slicing cannot split a character
        let can_id = u32::from_str_radix(&line[..ID_DIGITS], 16).ok()?;
        let mut payload = [0u8; 8];
        hex::decode_to_slice(&line[ID_DIGITS..], &mut payload).ok()?;

        Some((can_id, payload))
    }
}

/// Group parsed lines by CAN identifier
///
/// Each group keeps its internal order exactly as encountered in the trace -
/// the reassembly state machine depends on it. Across groups no order is
/// kept; the aggregator's final sort restores it.
pub fn partition_by_id(lines: Vec<TraceLine>) -> HashMap<u32, Vec<TraceLine>> {
    let mut groups: HashMap<u32, Vec<TraceLine>> = HashMap::new();
    for line in lines {
        groups.entry(line.can_id).or_default().push(line);
    }
    groups
}
