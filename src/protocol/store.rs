use crate::coding::Decoder;
use crate::protocol::link::NodeId;
use crate::protocol::ProtocolError;
use std::collections::{HashMap, HashSet};

/// Keyed table of live decoders and decoded flags.
///
/// Everything is keyed by `(generation id, origin)`, so many concurrent
/// generations from many origins decode independently — a relay overhearing
/// several sources never conflates their rank progress, and a destination
/// tells apart two origins that happen to reuse the same id. Slots are
/// created lazily on the first symbol for a key and are growth-capable;
/// there is no fixed origin capacity.
///
/// The destination and the relay path each own an independent store.
#[derive(Default)]
pub struct GenerationStore {
    decoders: HashMap<(u16, NodeId), Decoder>,
    decoded: HashSet<(u16, NodeId)>,
}

impl GenerationStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the decoder slot for a key, creating it on first sight.
    pub fn decoder_for(
        &mut self,
        generation: u16,
        origin: NodeId,
        symbols: usize,
        symbol_size: usize,
    ) -> Result<&mut Decoder, ProtocolError> {
        use std::collections::hash_map::Entry;
        match self.decoders.entry((generation, origin)) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(Decoder::new(symbols, symbol_size)?)),
        }
    }

    /// Whether a decoder slot exists for this key.
    pub fn has_decoder(&self, generation: u16, origin: NodeId) -> bool {
        self.decoders.contains_key(&(generation, origin))
    }

    /// Number of live decoder slots.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether the store holds no decoders.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Whether this generation has been marked decoded.
    pub fn is_decoded(&self, generation: u16, origin: NodeId) -> bool {
        self.decoded.contains(&(generation, origin))
    }

    /// Mark a generation decoded; returns true on the first marking.
    pub fn mark_decoded(&mut self, generation: u16, origin: NodeId) -> bool {
        self.decoded.insert((generation, origin))
    }

    /// Clear the decoded flag, as the sender does when (re)using an id.
    pub fn clear_decoded(&mut self, generation: u16, origin: NodeId) {
        self.decoded.remove(&(generation, origin));
    }

    /// Drop the decoder slot and flag for a key. Hook for id-reuse eviction
    /// policies; the engines themselves never evict.
    pub fn evict(&mut self, generation: u16, origin: NodeId) {
        self.decoders.remove(&(generation, origin));
        self.decoded.remove(&(generation, origin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: NodeId = NodeId([0, 0, 0, 0, 0, 0xa]);
    const B: NodeId = NodeId([0, 0, 0, 0, 0, 0xb]);

    #[test]
    fn test_lazy_single_slot_per_key() {
        let mut store = GenerationStore::new();
        assert!(store.is_empty());
        assert!(!store.has_decoder(1, A));

        store.decoder_for(1, A, 4, 16).unwrap();
        assert!(store.has_decoder(1, A));
        assert_eq!(store.len(), 1);

        // Same key resolves to the same slot.
        store.decoder_for(1, A, 4, 16).unwrap().decode(&{
            let mut p = vec![0u8; 20];
            p[0] = 1;
            p
        }).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.decoder_for(1, A, 4, 16).unwrap().rank(), 1);
    }

    #[test]
    fn test_origins_not_conflated() {
        let mut store = GenerationStore::new();
        store.decoder_for(1, A, 2, 4).unwrap();
        store.decoder_for(1, B, 2, 4).unwrap();
        store.decoder_for(2, A, 2, 4).unwrap();
        assert_eq!(store.len(), 3);

        let mut payload = vec![0u8; 6];
        payload[0] = 1;
        store.decoder_for(1, A, 2, 4).unwrap().decode(&payload).unwrap();
        assert_eq!(store.decoder_for(1, A, 2, 4).unwrap().rank(), 1);
        assert_eq!(store.decoder_for(1, B, 2, 4).unwrap().rank(), 0);
        assert_eq!(store.decoder_for(2, A, 2, 4).unwrap().rank(), 0);
    }

    #[test]
    fn test_decoded_flags() {
        let mut store = GenerationStore::new();
        assert!(!store.is_decoded(5, A));

        assert!(store.mark_decoded(5, A));
        assert!(store.is_decoded(5, A));
        // Second marking reports not-new.
        assert!(!store.mark_decoded(5, A));

        // Flags are per-key.
        assert!(!store.is_decoded(5, B));

        store.clear_decoded(5, A);
        assert!(!store.is_decoded(5, A));
    }

    #[test]
    fn test_evict_drops_slot_and_flag() {
        let mut store = GenerationStore::new();
        store.decoder_for(9, A, 2, 4).unwrap();
        store.mark_decoded(9, A);

        store.evict(9, A);
        assert!(!store.has_decoder(9, A));
        assert!(!store.is_decoded(9, A));
    }
}
