//! Core types for the ISO-TP trace decoder library
//!
//! This module defines the types that flow through the decoder: parsed trace
//! lines on the way in, decoded records on the way out. The decoder is
//! stateless between runs and only outputs records - it does not track
//! transactions across traces or respond to anything it decodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while reading a trace
///
/// Malformed trace lines and malformed ISO-TP frames are NOT errors: they are
/// skipped silently (best-effort decoding over legacy logs). The only fatal
/// conditions are failures to get at the trace bytes in the first place.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Trace file not found: {0:?}")]
    TraceNotFound(PathBuf),

    #[error("Failed to read trace: {0}")]
    Io(#[from] std::io::Error),
}

/// One validated line of a CAN trace
///
/// Represents a single classic CAN frame as recorded in the trace file:
/// an 11-bit identifier and exactly 8 payload bytes. The `index` is the
/// position of this line among *accepted* lines only - malformed lines do
/// not consume an index slot - and is what restores global output order
/// after per-identifier decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLine {
    /// Position among accepted lines, in original trace order
    pub index: usize,
    /// CAN identifier the frame was sent on
    pub can_id: u32,
    /// Raw frame payload (classic CAN, always 8 bytes in this trace format)
    pub payload: [u8; 8],
}

/// Flow status reported by an ISO-TP Flow Control frame
///
/// Decoded from the low nibble of the FC PCI byte. The decoder only reports
/// these; it never acts on them (no frames are ever sent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowStatus {
    /// Clear to send (0)
    ClearToSend,
    /// Wait (1)
    Wait,
    /// Receiver buffer overflow (2)
    Overflow,
    /// Reserved/unknown status value (3..=15)
    Reserved,
}

impl FlowStatus {
    /// Map the FC PCI low nibble to a flow status
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble {
            0 => FlowStatus::ClearToSend,
            1 => FlowStatus::Wait,
            2 => FlowStatus::Overflow,
            _ => FlowStatus::Reserved,
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::ClearToSend => write!(f, "CTS"),
            FlowStatus::Wait => write!(f, "WT"),
            FlowStatus::Overflow => write!(f, "OVFLW"),
            FlowStatus::Reserved => write!(f, "RES"),
        }
    }
}

/// Main decoded record type - the primary output of the decoder
///
/// One record per completed ISO-TP transaction observed in the trace. Records
/// carry the `index` of the trace line that completed them, so a sorted batch
/// reads in original chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRecord {
    /// A complete application payload: either a Single Frame, or a
    /// multi-frame message whose last Consecutive Frame arrived
    Message {
        /// Index of the completing trace line
        index: usize,
        /// CAN identifier the message was reassembled on
        can_id: u32,
        /// Reassembled payload bytes, truncated to the declared length
        payload: Vec<u8>,
    },

    /// An observed Flow Control frame (informational only)
    FlowControl {
        /// Index of the trace line carrying the FC frame
        index: usize,
        /// CAN identifier the FC frame was sent on
        can_id: u32,
        /// Flow status from the PCI low nibble
        status: FlowStatus,
        /// Advised maximum frames per block
        block_size: u8,
        /// Advised minimum separation time between frames
        st_min: u8,
    },
}

impl DecodedRecord {
    /// Get the trace-line index of this record
    pub fn index(&self) -> usize {
        match self {
            DecodedRecord::Message { index, .. } => *index,
            DecodedRecord::FlowControl { index, .. } => *index,
        }
    }

    /// Get the CAN identifier of this record
    pub fn can_id(&self) -> u32 {
        match self {
            DecodedRecord::Message { can_id, .. } => *can_id,
            DecodedRecord::FlowControl { can_id, .. } => *can_id,
        }
    }

    /// Render the record body: lowercase hex for payloads, an `FC [...]`
    /// description for flow-control frames
    pub fn text(&self) -> String {
        match self {
            DecodedRecord::Message { payload, .. } => hex::encode(payload),
            DecodedRecord::FlowControl {
                status,
                block_size,
                st_min,
                ..
            } => {
                format!("FC [{}], BlockSize={}, STmin={}", status, block_size, st_min)
            }
        }
    }
}

impl fmt::Display for DecodedRecord {
    /// The final output line: `<can_id in lowercase hex>: <text>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}: {}", self.can_id(), self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_status_mapping() {
        assert_eq!(FlowStatus::from_nibble(0), FlowStatus::ClearToSend);
        assert_eq!(FlowStatus::from_nibble(1), FlowStatus::Wait);
        assert_eq!(FlowStatus::from_nibble(2), FlowStatus::Overflow);
        for nibble in 3..=15u8 {
            assert_eq!(FlowStatus::from_nibble(nibble), FlowStatus::Reserved);
        }
    }

    #[test]
    fn test_flow_status_display() {
        assert_eq!(format!("{}", FlowStatus::ClearToSend), "CTS");
        assert_eq!(format!("{}", FlowStatus::Wait), "WT");
        assert_eq!(format!("{}", FlowStatus::Overflow), "OVFLW");
        assert_eq!(format!("{}", FlowStatus::Reserved), "RES");
    }

    #[test]
    fn test_message_record_rendering() {
        let record = DecodedRecord::Message {
            index: 3,
            can_id: 0x7DF,
            payload: vec![0xAA, 0xBB],
        };
        assert_eq!(record.index(), 3);
        assert_eq!(record.can_id(), 0x7DF);
        assert_eq!(record.text(), "aabb");
        assert_eq!(format!("{}", record), "7df: aabb");
    }

    #[test]
    fn test_flow_control_record_rendering() {
        let record = DecodedRecord::FlowControl {
            index: 0,
            can_id: 0x7E8,
            status: FlowStatus::ClearToSend,
            block_size: 0,
            st_min: 20,
        };
        assert_eq!(record.text(), "FC [CTS], BlockSize=0, STmin=20");
        assert_eq!(format!("{}", record), "7e8: FC [CTS], BlockSize=0, STmin=20");
    }

    #[test]
    fn test_can_id_prints_without_padding() {
        let record = DecodedRecord::Message {
            index: 0,
            can_id: 0x07F,
            payload: vec![0x01],
        };
        assert_eq!(format!("{}", record), "7f: 01");
    }
}
