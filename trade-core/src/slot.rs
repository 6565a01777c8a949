//! Storage for the record received during a trade.

use gen1_proto::codec::offsets;
use gen1_proto::{
    decode_party_record, CoreBlock, PartyRecord, Trailer, CORE_BLOCK_SIZE, PARTY_RECORD_SIZE,
};

/// Received party record, filled one byte at a time.
///
/// Cleared to all zeroes before every trade attempt. Bytes the exchange has
/// not reached yet stay zero, so a failed attempt never exposes data from an
/// earlier trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedSlot {
    bytes: [u8; PARTY_RECORD_SIZE],
    received: usize,
}

impl ReceivedSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; PARTY_RECORD_SIZE],
            received: 0,
        }
    }

    /// Zero every byte and forget what was received.
    pub fn clear(&mut self) {
        self.bytes = [0; PARTY_RECORD_SIZE];
        self.received = 0;
    }

    /// Store byte `index` of the peer's core block.
    ///
    /// Indices past the core block are ignored.
    pub fn write(&mut self, index: usize, byte: u8) {
        if index < CORE_BLOCK_SIZE {
            self.bytes[index] = byte;
            self.received = self.received.max(index + 1);
        }
    }

    /// Store the peer's nickname and OT name after the core block.
    pub fn write_trailer(&mut self, trailer: &Trailer) {
        self.bytes[offsets::NICKNAME..].copy_from_slice(trailer);
    }

    /// Number of core block bytes received so far.
    #[must_use]
    pub fn received_len(&self) -> usize {
        self.received
    }

    /// True once the whole core block has arrived.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.received == CORE_BLOCK_SIZE
    }

    #[must_use]
    pub fn core_block(&self) -> CoreBlock {
        let mut block = [0; CORE_BLOCK_SIZE];
        block.copy_from_slice(&self.bytes[..CORE_BLOCK_SIZE]);
        block
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PARTY_RECORD_SIZE] {
        &self.bytes
    }

    /// Decode the slot contents, zeroed fields included.
    #[must_use]
    pub fn record(&self) -> PartyRecord {
        decode_party_record(&self.bytes)
    }
}

impl Default for ReceivedSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen1_proto::{build_level1_record, encode_core_block, encode_trailer, MAGIKARP};
    use proptest::prelude::*;

    #[test]
    fn test_new_slot_is_zeroed() {
        let slot = ReceivedSlot::new();
        assert!(slot.as_bytes().iter().all(|&b| b == 0));
        assert!(!slot.is_populated());
        assert_eq!(slot.record(), PartyRecord::zeroed());
    }

    #[test]
    fn test_partial_fill_leaves_rest_zeroed() {
        let block = encode_core_block(&build_level1_record(&MAGIKARP, "RP2040", 1));
        let mut slot = ReceivedSlot::new();
        for (i, &b) in block.iter().take(4).enumerate() {
            slot.write(i, b);
        }

        assert_eq!(slot.received_len(), 4);
        assert!(!slot.is_populated());
        let record = slot.record();
        assert_eq!(record.species, MAGIKARP.species);
        assert_eq!(record.level, 0);
        assert_eq!(record.stats.hp, 0);
    }

    #[test]
    fn test_full_block_and_clear() {
        let pkm = build_level1_record(&MAGIKARP, "RP2040", 1);
        let block = encode_core_block(&pkm);
        let mut slot = ReceivedSlot::new();
        for (i, &b) in block.iter().enumerate() {
            slot.write(i, b);
        }
        slot.write(CORE_BLOCK_SIZE, 0xAA);

        assert!(slot.is_populated());
        assert_eq!(slot.core_block(), block);
        assert_eq!(slot.record().nickname, [0; 11]);

        slot.write_trailer(&encode_trailer(&pkm));
        assert_eq!(slot.record(), pkm);

        slot.clear();
        assert_eq!(slot, ReceivedSlot::new());
    }

    proptest! {
        #[test]
        fn prop_prefix_write_keeps_tail_zeroed(
            head in any::<[u8; 32]>(),
            tail in any::<[u8; 12]>(),
            len in 0..=CORE_BLOCK_SIZE,
        ) {
            let mut block = [0u8; CORE_BLOCK_SIZE];
            block[..32].copy_from_slice(&head);
            block[32..].copy_from_slice(&tail);

            let mut slot = ReceivedSlot::new();
            for (i, &b) in block.iter().take(len).enumerate() {
                slot.write(i, b);
            }

            prop_assert_eq!(slot.received_len(), len);
            prop_assert_eq!(&slot.as_bytes()[..len], &block[..len]);
            prop_assert!(slot.as_bytes()[len..].iter().all(|&b| b == 0));
        }
    }
}
