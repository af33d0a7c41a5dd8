//! ISO-TP frame classification
//!
//! Classifies a raw CAN payload by its PCI (Protocol Control Information)
//! byte into one of the four ISO-TP frame types. All frame-shape validation
//! lives here; the reassembly session only ever sees well-formed frames.

use crate::types::FlowStatus;

/// PCI high-nibble values for the four frame types
const PCI_SINGLE: u8 = 0x0;
const PCI_FIRST: u8 = 0x1;
const PCI_CONSECUTIVE: u8 = 0x2;
const PCI_FLOW_CONTROL: u8 = 0x3;

/// Maximum data bytes a Single Frame can carry on classic CAN
const SINGLE_FRAME_MAX: usize = 7;

/// A classified ISO-TP frame, borrowing its data from the raw CAN payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsotpFrame<'a> {
    /// Single Frame: a complete message of 1..=7 bytes
    Single { data: &'a [u8] },
    /// First Frame: opens a multi-frame transfer; `total_len` is the
    /// declared 12-bit message length, `data` the bytes following the header
    First { total_len: usize, data: &'a [u8] },
    /// Consecutive Frame: continuation data with a 4-bit sequence number
    Consecutive { sequence: u8, data: &'a [u8] },
    /// Flow Control frame: receiver pacing parameters
    FlowControl {
        status: FlowStatus,
        block_size: u8,
        st_min: u8,
    },
}

impl<'a> IsotpFrame<'a> {
    /// Classify a raw CAN payload by its PCI byte
    ///
    /// Returns `None` for payloads that do not form a valid ISO-TP frame:
    /// * empty payloads
    /// * a reserved PCI type nibble (anything above 3)
    /// * a Single Frame whose length nibble is 0, above 7, or larger than
    ///   the bytes actually present
    /// * a First Frame shorter than its 2-byte header
    /// * a Flow Control frame shorter than 3 bytes (BlockSize and STmin
    ///   must be present, never read out of bounds)
    pub fn classify(payload: &'a [u8]) -> Option<Self> {
        let pci = *payload.first()?;
        match pci >> 4 {
            PCI_SINGLE => {
                let len = (pci & 0x0F) as usize;
                if len == 0 || len > SINGLE_FRAME_MAX || payload.len() < 1 + len {
                    return None;
                }
                Some(IsotpFrame::Single {
                    data: &payload[1..1 + len],
                })
            }
            PCI_FIRST => {
                if payload.len() < 2 {
                    return None;
                }
                let total_len = ((pci & 0x0F) as usize) << 8 | payload[1] as usize;
                Some(IsotpFrame::First {
                    total_len,
                    data: &payload[2..],
                })
            }
            PCI_CONSECUTIVE => Some(IsotpFrame::Consecutive {
                sequence: pci & 0x0F,
                data: &payload[1..],
            }),
            PCI_FLOW_CONTROL => {
                if payload.len() < 3 {
                    return None;
                }
                Some(IsotpFrame::FlowControl {
                    status: FlowStatus::from_nibble(pci & 0x0F),
                    block_size: payload[1],
                    st_min: payload[2],
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_single() {
        let data = hex::decode("02AABB0000000000").unwrap();
        match IsotpFrame::classify(&data) {
            Some(IsotpFrame::Single { data }) => {
                assert_eq!(data, hex::decode("AABB").unwrap());
            }
            other => panic!("expected Single, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_single_full_length() {
        let data = hex::decode("07AABBCCDDEEFF11").unwrap();
        match IsotpFrame::classify(&data) {
            Some(IsotpFrame::Single { data }) => {
                assert_eq!(data.len(), 7);
                assert_eq!(data[6], 0x11);
            }
            other => panic!("expected Single, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_single_zero_length() {
        let data = hex::decode("0011223344556677").unwrap();
        assert_eq!(IsotpFrame::classify(&data), None);
    }

    #[test]
    fn test_reject_single_oversized_length() {
        // length nibble 8 cannot fit in a classic CAN frame
        let data = hex::decode("08AABBCCDDEEFF11").unwrap();
        assert_eq!(IsotpFrame::classify(&data), None);
    }

    #[test]
    fn test_reject_single_truncated() {
        // claims 5 data bytes but only 2 are present
        assert_eq!(IsotpFrame::classify(&[0x05, 0xAA, 0xBB]), None);
    }

    #[test]
    fn test_classify_first() {
        let data = hex::decode("100A112233445566").unwrap();
        match IsotpFrame::classify(&data) {
            Some(IsotpFrame::First { total_len, data }) => {
                assert_eq!(total_len, 10);
                assert_eq!(data, hex::decode("112233445566").unwrap());
            }
            other => panic!("expected First, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_first_twelve_bit_length() {
        let data = hex::decode("1FFF112233445566").unwrap();
        match IsotpFrame::classify(&data) {
            Some(IsotpFrame::First { total_len, .. }) => assert_eq!(total_len, 0xFFF),
            other => panic!("expected First, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_first_missing_length_byte() {
        assert_eq!(IsotpFrame::classify(&[0x10]), None);
    }

    #[test]
    fn test_classify_consecutive() {
        let data = hex::decode("21778899AABBCCDD").unwrap();
        match IsotpFrame::classify(&data) {
            Some(IsotpFrame::Consecutive { sequence, data }) => {
                assert_eq!(sequence, 1);
                assert_eq!(data, hex::decode("778899AABBCCDD").unwrap());
            }
            other => panic!("expected Consecutive, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_flow_control() {
        let data = hex::decode("30050A0000000000").unwrap();
        match IsotpFrame::classify(&data) {
            Some(IsotpFrame::FlowControl {
                status,
                block_size,
                st_min,
            }) => {
                assert_eq!(status, FlowStatus::ClearToSend);
                assert_eq!(block_size, 5);
                assert_eq!(st_min, 10);
            }
            other => panic!("expected FlowControl, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_flow_control_statuses() {
        let expectations = [
            (0x30u8, FlowStatus::ClearToSend),
            (0x31, FlowStatus::Wait),
            (0x32, FlowStatus::Overflow),
            (0x33, FlowStatus::Reserved),
            (0x3F, FlowStatus::Reserved),
        ];
        for (pci, expected) in expectations {
            match IsotpFrame::classify(&[pci, 0x00, 0x00]) {
                Some(IsotpFrame::FlowControl { status, .. }) => assert_eq!(status, expected),
                other => panic!("expected FlowControl, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_reject_short_flow_control() {
        // BlockSize present but STmin missing
        assert_eq!(IsotpFrame::classify(&[0x30, 0x05]), None);
        assert_eq!(IsotpFrame::classify(&[0x30]), None);
    }

    #[test]
    fn test_reject_empty_payload() {
        assert_eq!(IsotpFrame::classify(&[]), None);
    }

    #[test]
    fn test_reject_reserved_pci_types() {
        for high in 4..=15u8 {
            let payload = [high << 4, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];
            assert_eq!(IsotpFrame::classify(&payload), None);
        }
    }
}
