//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct is the entry point: it parses a trace, partitions the
//! lines by CAN identifier, runs one reassembly session per identifier, and
//! merges the records back into trace order.

use crate::aggregator::RecordCollector;
use crate::config::DecoderConfig;
use crate::isotp::ReassemblySession;
use crate::trace::{partition_by_id, TraceParser};
use crate::types::{DecodedRecord, Result, TraceLine};
use rayon::prelude::*;
use std::io::BufRead;
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a new decoder with default configuration
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::new())
    }

    /// Create a new decoder with a custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a trace file into records in trace order
    ///
    /// # Arguments
    /// * `path` - Path to the trace file
    ///
    /// # Returns
    /// * `Result<Vec<DecodedRecord>>` - records sorted by line index, or an
    ///   error if the file could not be read
    ///
    /// # Example
    /// ```no_run
    /// use isotp_trace_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let records = decoder.decode_file(Path::new("bus.trace")).unwrap();
    /// for record in records {
    ///     println!("{}", record);
    /// }
    /// ```
    pub fn decode_file(&self, path: &Path) -> Result<Vec<DecodedRecord>> {
        log::info!("Decoding trace file: {:?}", path);
        let lines = TraceParser::parse_file(path)?;
        Ok(self.decode(lines))
    }

    /// Decode a trace from any buffered reader
    pub fn decode_reader<R: BufRead>(&self, reader: R) -> Result<Vec<DecodedRecord>> {
        let lines = TraceParser::parse_reader(reader)?;
        Ok(self.decode(lines))
    }

    /// Decode already-split trace lines (infallible in-memory path)
    ///
    /// # Example
    /// ```
    /// use isotp_trace_decoder::Decoder;
    ///
    /// let records = Decoder::new().decode_lines([
    ///     "7DF02AABBCC00000000",
    /// ]);
    /// assert_eq!(records[0].to_string(), "7df: aabb");
    /// ```
    pub fn decode_lines<I, S>(&self, lines: I) -> Vec<DecodedRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.decode(TraceParser::parse_lines(lines))
    }

    /// Run the partition / reassemble / merge pipeline over parsed lines
    fn decode(&self, mut lines: Vec<TraceLine>) -> Vec<DecodedRecord> {
        if self.config.id_filter.is_some() {
            // Indices were assigned before filtering, so surviving records
            // keep their original trace positions
            lines.retain(|line| self.config.should_process_id(line.can_id));
        }

        let groups = partition_by_id(lines);
        log::debug!("Decoding {} identifier group(s)", groups.len());

        let collector = RecordCollector::new();
        if self.config.parallel && groups.len() > 1 {
            groups
                .into_par_iter()
                .for_each(|(_, group)| run_session(group, &collector));
        } else {
            for (_, group) in groups {
                run_session(group, &collector);
            }
        }

        let records = collector.into_sorted();
        log::debug!("Produced {} record(s)", records.len());
        records
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed one identifier's lines through a fresh reassembly session
fn run_session(group: Vec<TraceLine>, collector: &RecordCollector) {
    let mut session = ReassemblySession::new();
    for line in &group {
        if let Some(record) = session.process(line) {
            collector.append(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // First frame on 0x700, then a single frame and a flow control on other
    // identifiers, then the consecutive frame completing the 0x700 message
    const INTERLEAVED_TRACE: [&str; 4] = [
        "700100A112233445566",
        "7DF02AABBCC00000000",
        "7E830050A0000000000",
        "70021778899AABBCCDD",
    ];

    fn render(records: &[DecodedRecord]) -> Vec<String> {
        records.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        let records = Decoder::new().decode_lines(Vec::<&str>::new());
        assert!(records.is_empty());
    }

    #[test]
    fn test_interleaved_identifiers_in_trace_order() {
        let records = Decoder::new().decode_lines(INTERLEAVED_TRACE);
        assert_eq!(
            render(&records),
            vec![
                "7df: aabb",
                "7e8: FC [CTS], BlockSize=5, STmin=10",
                "700: 112233445566778899aa",
            ]
        );
        let indices: Vec<usize> = records.iter().map(|r| r.index()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_id_filter_keeps_original_indices() {
        let decoder = Decoder::with_config(DecoderConfig::new().with_id_filter(vec![0x700]));
        let records = decoder.decode_lines(INTERLEAVED_TRACE);

        assert_eq!(render(&records), vec!["700: 112233445566778899aa"]);
        assert_eq!(records[0].index(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = Decoder::new().decode_lines(INTERLEAVED_TRACE);
        let sequential = Decoder::with_config(DecoderConfig::new().with_parallel(false))
            .decode_lines(INTERLEAVED_TRACE);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_decode_reader() {
        let data = INTERLEAVED_TRACE.join("\n");
        let records = Decoder::new().decode_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let result = Decoder::new().decode_file(Path::new("no_such.trace"));
        assert!(result.is_err());
    }
}
