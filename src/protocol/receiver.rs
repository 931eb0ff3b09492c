use crate::protocol::config::Config;
use crate::protocol::header::GenerationHeader;
use crate::protocol::link::{Action, Frame, NodeId, PROTO_ACK};
use crate::protocol::stats::Stats;
use crate::protocol::store::GenerationStore;
use crate::protocol::ProtocolError;
use tracing::{debug, trace, warn};

/// Padding bytes carried by an acknowledgement frame after its header.
const ACK_PADDING: usize = 10;

/// Receiver engine: the destination-side decode, deliver, and acknowledge
/// path.
///
/// Each `(generation, origin)` key moves through absent -> decoding ->
/// complete-unacked -> complete-acked, realized as a lazily created decoder
/// slot plus the decoded flag in the store. Completion delivers the K
/// original packets upward in source order and acks the immediate frame
/// source; anything arriving after that only provokes an idempotent
/// duplicate ack.
pub struct ReceiverEngine {
    local: NodeId,
    config: Config,
}

impl ReceiverEngine {
    /// Receiver for the node `local`.
    pub fn new(local: NodeId, config: Config) -> Self {
        Self { local, config }
    }

    /// Process one destination-addressed coded data frame.
    ///
    /// `header` and `body` are the already-split frame payload;
    /// `frame_source` is the link-layer transmitter of this hop, which is
    /// where any acknowledgement goes back to.
    pub fn handle_data(
        &mut self,
        header: &GenerationHeader,
        body: &[u8],
        frame_source: NodeId,
        store: &mut GenerationStore,
        stats: &mut Stats,
    ) -> Result<Vec<Action>, ProtocolError> {
        // A self-authored generation looped back to us: the sender side of
        // this node observing its own traffic. Mark and bail so a node
        // never "decodes" what it transmitted.
        if header.origin == self.local {
            store.mark_decoded(header.generation, header.origin);
            stats.own_echoes += 1;
            debug!(generation = header.generation, "own generation echoed back, marked decoded");
            return Ok(Vec::new());
        }

        stats.received_coded += 1;
        if frame_source == header.origin {
            stats.from_origin += 1;
        } else {
            stats.from_relay += 1;
        }

        let decoder = store.decoder_for(
            header.generation,
            header.origin,
            self.config.generation_size,
            self.config.symbol_size,
        )?;
        if body.len() != decoder.payload_size() {
            // Desynchronized or corrupted header; abandon the frame without
            // touching decoder state.
            warn!(
                generation = header.generation,
                expected = decoder.payload_size(),
                actual = body.len(),
                "payload size mismatch, dropping frame"
            );
            return Err(ProtocolError::PayloadSizeMismatch {
                expected: decoder.payload_size(),
                actual: body.len(),
            });
        }

        let innovative = decoder.decode(body)?;
        if innovative {
            stats.innovative += 1;
        } else {
            stats.redundant += 1;
        }
        trace!(
            generation = header.generation,
            origin = %header.origin,
            rank = decoder.rank(),
            innovative,
            "absorbed symbol"
        );

        if !decoder.is_complete() {
            return Ok(Vec::new());
        }

        if store.is_decoded(header.generation, header.origin) {
            // Late duplicate after completion: the ack was lost or the
            // sender has not observed it yet. Re-ack, never re-deliver.
            stats.acks_sent += 1;
            return Ok(vec![Action::Transmit(
                self.ack_frame(header, frame_source),
            )]);
        }

        // First completion: deliver the reconstructed batch in source order
        // and acknowledge towards whoever completed us.
        store.mark_decoded(header.generation, header.origin);
        stats.generations_decoded += 1;

        let block = store
            .decoder_for(
                header.generation,
                header.origin,
                self.config.generation_size,
                self.config.symbol_size,
            )?
            .copy_symbols()?;

        let mut actions = Vec::with_capacity(self.config.generation_size + 1);
        actions.push(Action::Transmit(self.ack_frame(header, frame_source)));
        stats.acks_sent += 1;
        for packet in block.chunks_exact(self.config.symbol_size) {
            actions.push(Action::Deliver(packet.to_vec()));
            stats.packets_delivered += 1;
        }
        debug!(
            generation = header.generation,
            origin = %header.origin,
            packets = self.config.generation_size,
            "generation decoded and delivered"
        );
        Ok(actions)
    }

    /// Acknowledgement frame: the generation header with the coding flag
    /// cleared, a little padding, addressed to the immediate frame source.
    fn ack_frame(&self, header: &GenerationHeader, frame_source: NodeId) -> Frame {
        let mut payload = header.ack().encode().to_vec();
        payload.extend_from_slice(&[0u8; ACK_PADDING]);
        Frame {
            payload,
            source: self.local,
            destination: frame_source,
            protocol: PROTO_ACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::Encoder;
    use crate::utils::CodingRng;

    const LOCAL: NodeId = NodeId([0, 0, 0, 0, 0, 1]);
    const ORIGIN: NodeId = NodeId([0, 0, 0, 0, 0, 2]);
    const RELAY: NodeId = NodeId([0, 0, 0, 0, 0, 3]);

    const K: usize = 3;
    const SYMBOL_SIZE: usize = 4;

    fn config() -> Config {
        Config {
            generation_size: K,
            symbol_size: SYMBOL_SIZE,
            ..Config::default()
        }
    }

    fn block() -> Vec<u8> {
        (1..=(K * SYMBOL_SIZE) as u8).collect()
    }

    fn encoder() -> Encoder {
        let mut encoder = Encoder::new(K, SYMBOL_SIZE).unwrap();
        encoder.set_symbols(&block()).unwrap();
        encoder
    }

    fn header() -> GenerationHeader {
        GenerationHeader::data(1, ORIGIN)
    }

    struct Harness {
        receiver: ReceiverEngine,
        store: GenerationStore,
        stats: Stats,
        rng: CodingRng,
        encoder: Encoder,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                receiver: ReceiverEngine::new(LOCAL, config()),
                store: GenerationStore::new(),
                stats: Stats::default(),
                rng: CodingRng::from_seed([42; 32]),
                encoder: encoder(),
            }
        }

        fn feed(&mut self, from: NodeId) -> Vec<Action> {
            let payload = self.encoder.encode(&mut self.rng).unwrap();
            self.receiver
                .handle_data(&header(), &payload, from, &mut self.store, &mut self.stats)
                .unwrap()
        }

        fn feed_until_complete(&mut self) -> Vec<Action> {
            loop {
                let actions = self.feed(ORIGIN);
                if !actions.is_empty() {
                    return actions;
                }
            }
        }
    }

    #[test]
    fn test_own_echo_marks_decoded() {
        let mut h = Harness::new();
        let own = GenerationHeader::data(7, LOCAL);
        let actions = h
            .receiver
            .handle_data(&own, &[0u8; 7], ORIGIN, &mut h.store, &mut h.stats)
            .unwrap();

        assert!(actions.is_empty());
        assert!(h.store.is_decoded(7, LOCAL));
        assert!(!h.store.has_decoder(7, LOCAL));
        assert_eq!(h.stats.own_echoes, 1);
    }

    #[test]
    fn test_size_mismatch_is_fatal_for_frame() {
        let mut h = Harness::new();
        let err = h
            .receiver
            .handle_data(&header(), &[0u8; 5], ORIGIN, &mut h.store, &mut h.stats)
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::PayloadSizeMismatch {
                expected: K + SYMBOL_SIZE,
                actual: 5
            }
        );
        // Decoder state untouched.
        assert_eq!(h.store.decoder_for(1, ORIGIN, K, SYMBOL_SIZE).unwrap().rank(), 0);
    }

    #[test]
    fn test_innovative_and_redundant_classification() {
        let mut h = Harness::new();
        let payload = h.encoder.encode(&mut h.rng).unwrap();

        h.receiver
            .handle_data(&header(), &payload, ORIGIN, &mut h.store, &mut h.stats)
            .unwrap();
        assert_eq!(h.stats.innovative, 1);

        // The identical payload again is dependent.
        h.receiver
            .handle_data(&header(), &payload, ORIGIN, &mut h.store, &mut h.stats)
            .unwrap();
        assert_eq!(h.stats.redundant, 1);
        assert_eq!(h.stats.innovative, 1);
    }

    #[test]
    fn test_completion_delivers_in_order_and_acks_once() {
        let mut h = Harness::new();
        let actions = h.feed_until_complete();

        let mut delivered = Vec::new();
        let mut acks = 0;
        for action in &actions {
            match action {
                Action::Deliver(packet) => delivered.extend_from_slice(packet),
                Action::Transmit(frame) => {
                    acks += 1;
                    assert_eq!(frame.destination, ORIGIN);
                    assert_eq!(frame.protocol, PROTO_ACK);
                    let (ack, rest) = GenerationHeader::decode(&frame.payload).unwrap();
                    assert!(!ack.coded);
                    assert_eq!(ack.generation, 1);
                    assert_eq!(ack.origin, ORIGIN);
                    assert_eq!(rest.len(), ACK_PADDING);
                }
            }
        }
        assert_eq!(acks, 1);
        assert_eq!(delivered, block());
        assert_eq!(h.stats.generations_decoded, 1);
        assert_eq!(h.stats.packets_delivered, K as u64);
    }

    #[test]
    fn test_duplicate_after_completion_reacks_only() {
        let mut h = Harness::new();
        h.feed_until_complete();

        // A late symbol relayed in after completion.
        let actions = h.feed(RELAY);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Transmit(frame) => {
                // Ack goes to the immediate source of the late frame.
                assert_eq!(frame.destination, RELAY);
                let (ack, _) = GenerationHeader::decode(&frame.payload).unwrap();
                assert!(!ack.coded);
            }
            Action::Deliver(_) => panic!("late duplicate must not re-deliver"),
        }
        assert_eq!(h.stats.generations_decoded, 1);
        assert_eq!(h.stats.packets_delivered, K as u64);
        assert_eq!(h.stats.acks_sent, 2);
    }

    #[test]
    fn test_origin_vs_relay_accounting() {
        let mut h = Harness::new();
        h.feed(ORIGIN);
        h.feed(RELAY);
        assert_eq!(h.stats.from_origin, 1);
        assert_eq!(h.stats.from_relay, 1);
        assert_eq!(h.stats.received_coded, 2);
    }
}
