//! ISO-TP reassembly state machine
//!
//! One session per CAN identifier, fed that identifier's frames in trace
//! order. The session has two states and the following transitions:
//!
//! | State      | Frame            | Action                                          |
//! |------------|------------------|-------------------------------------------------|
//! | any        | Single Frame     | emit the message, state unchanged               |
//! | any        | First Frame      | start a fresh assembly (discard any in flight)  |
//! | Idle       | Consecutive      | ignore                                          |
//! | Assembling | Consecutive (ok) | append; emit and go Idle once length is reached |
//! | Assembling | Consecutive (bad)| drop the frame, abandon the assembly, go Idle   |
//! | any        | Flow Control     | emit a flow-control record, state unchanged     |
//!
//! A "bad" consecutive frame is one whose sequence number is not the
//! 4-bit successor of the last accepted one.

use crate::isotp::frame::IsotpFrame;
use crate::types::{DecodedRecord, FlowStatus, TraceLine};

/// Reassembly state for one CAN identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum State {
    /// No multi-frame transfer in progress
    #[default]
    Idle,
    /// Collecting consecutive frames after a First Frame
    Assembling {
        /// Declared total message length from the First Frame header
        expected: usize,
        /// Sequence number of the last accepted frame (the First Frame
        /// counts as 0)
        last_sn: u8,
        /// Message bytes collected so far
        data: Vec<u8>,
    },
}

/// Per-identifier ISO-TP reassembly session
///
/// Consumes one frame at a time and produces at most one record per frame.
/// Single Frames and Flow Control frames pass straight through without
/// touching a multi-frame assembly in progress; only First and Consecutive
/// frames drive the state machine.
#[derive(Debug, Default)]
pub struct ReassemblySession {
    state: State,
}

impl ReassemblySession {
    /// Create a new session in the Idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one trace line through the state machine
    ///
    /// Returns a record when the line produced one: a `Message` for a
    /// Single Frame or a completed multi-frame assembly, a `FlowControl`
    /// for an observed flow-control frame, `None` otherwise. Payloads that
    /// do not classify as ISO-TP frames are ignored.
    pub fn process(&mut self, line: &TraceLine) -> Option<DecodedRecord> {
        match IsotpFrame::classify(&line.payload)? {
            IsotpFrame::Single { data } => self.handle_single(line, data),
            IsotpFrame::First { total_len, data } => self.handle_first(line, total_len, data),
            IsotpFrame::Consecutive { sequence, data } => {
                self.handle_consecutive(line, sequence, data)
            }
            IsotpFrame::FlowControl {
                status,
                block_size,
                st_min,
            } => self.handle_flow_control(line, status, block_size, st_min),
        }
    }

    /// A Single Frame is a complete message on its own, independent of any
    /// assembly in progress
    fn handle_single(&mut self, line: &TraceLine, data: &[u8]) -> Option<DecodedRecord> {
        log::trace!(
            "CAN ID {:03x}: single frame with {} bytes",
            line.can_id,
            data.len()
        );
        Some(DecodedRecord::Message {
            index: line.index,
            can_id: line.can_id,
            payload: data.to_vec(),
        })
    }

    /// A First Frame unconditionally starts a fresh assembly
    fn handle_first(
        &mut self,
        line: &TraceLine,
        total_len: usize,
        data: &[u8],
    ) -> Option<DecodedRecord> {
        if let State::Assembling { expected, data, .. } = &self.state {
            log::debug!(
                "CAN ID {:03x}: first frame discards assembly at {}/{} bytes",
                line.can_id,
                data.len(),
                expected
            );
        }
        log::trace!(
            "CAN ID {:03x}: first frame declares {} bytes, {} seeded",
            line.can_id,
            total_len,
            data.len()
        );
        // Completion is only ever checked on consecutive frames, so even a
        // declared length already covered by the seed bytes waits for the
        // next consecutive frame.
        self.state = State::Assembling {
            expected: total_len,
            last_sn: 0,
            data: data.to_vec(),
        };
        None
    }

    fn handle_consecutive(
        &mut self,
        line: &TraceLine,
        sequence: u8,
        data: &[u8],
    ) -> Option<DecodedRecord> {
        let State::Assembling {
            expected,
            last_sn,
            data: buffer,
        } = &mut self.state
        else {
            log::trace!(
                "CAN ID {:03x}: consecutive frame outside an assembly, ignored",
                line.can_id
            );
            return None;
        };

        let next_sn = (*last_sn + 1) % 16;
        if sequence != next_sn {
            log::debug!(
                "CAN ID {:03x}: consecutive frame sequence {} (expected {}), abandoning {} collected bytes",
                line.can_id,
                sequence,
                next_sn,
                buffer.len()
            );
            self.state = State::Idle;
            return None;
        }

        buffer.extend_from_slice(data);
        *last_sn = sequence;

        if buffer.len() >= *expected {
            let total = *expected;
            let mut payload = std::mem::take(buffer);
            self.state = State::Idle;
            // The final frame may carry padding past the declared length
            payload.truncate(total);
            log::trace!(
                "CAN ID {:03x}: assembly complete with {} bytes",
                line.can_id,
                payload.len()
            );
            return Some(DecodedRecord::Message {
                index: line.index,
                can_id: line.can_id,
                payload,
            });
        }
        None
    }

    /// Flow control frames are reported but never acted on; the decoder is
    /// a passive observer and does not pace anything
    fn handle_flow_control(
        &mut self,
        line: &TraceLine,
        status: FlowStatus,
        block_size: u8,
        st_min: u8,
    ) -> Option<DecodedRecord> {
        log::trace!(
            "CAN ID {:03x}: flow control {}, BlockSize={}, STmin={}",
            line.can_id,
            status,
            block_size,
            st_min
        );
        Some(DecodedRecord::FlowControl {
            index: line.index,
            can_id: line.can_id,
            status,
            block_size,
            st_min,
        })
    }
}
