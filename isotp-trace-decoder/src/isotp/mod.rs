//! ISO-TP (ISO 15765-2) frame classification and message reassembly
//!
//! This module contains the transport-layer core of the decoder: classifying
//! raw CAN payloads into ISO-TP frame types (SF, FF, CF, FC) and reassembling
//! multi-frame messages with a per-identifier state machine.

pub mod frame;
pub mod session;

// Re-export the frame and session types
pub use frame::IsotpFrame;
pub use session::ReassemblySession;
