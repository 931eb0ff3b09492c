use crate::protocol::config::Config;
use crate::protocol::header::GenerationHeader;
use crate::protocol::link::{Action, Disposition, Frame, NodeId, PROTO_CONTROL};
use crate::protocol::receiver::ReceiverEngine;
use crate::protocol::relay::RelayEngine;
use crate::protocol::sender::{SenderEngine, SenderTick};
use crate::protocol::stats::Stats;
use crate::protocol::store::GenerationStore;
use crate::protocol::ProtocolError;
use crate::utils::CodingRng;
use tracing::{debug, trace};

/// One node's worth of protocol state, and the only entry points into it.
///
/// Owns the sender, receiver, and relay engines plus their tables; nothing
/// here is global or shared between nodes — all coordination is frames on
/// the medium. The embedder drives the node from exactly two event sources:
///
/// - [`CodedNode::handle_frame`] on every inbound frame, and
/// - [`CodedNode::tick`] on each scheduled retransmission timer.
///
/// Both complete synchronously and return the [`Action`]s to execute. A
/// transmit that subsequently fails on the link is ordinary medium loss;
/// the engine is never told and recovers through redundancy.
pub struct CodedNode {
    id: NodeId,
    config: Config,
    rng: CodingRng,
    sender: SenderEngine,
    receiver: ReceiverEngine,
    relay: RelayEngine,
    /// Destination-path decoders, plus the sender's own decoded flags
    dest_store: GenerationStore,
    /// Relay-path decoders, independent of the destination's
    relay_store: GenerationStore,
    stats: Stats,
}

impl CodedNode {
    /// Build a node with entropy-seeded randomness.
    pub fn new(id: NodeId, config: Config) -> Result<Self, ProtocolError> {
        Self::with_rng(id, config, CodingRng::new())
    }

    /// Build a node with a caller-seeded RNG, for reproducible runs.
    pub fn with_seed(id: NodeId, config: Config, seed: [u8; 32]) -> Result<Self, ProtocolError> {
        Self::with_rng(id, config, CodingRng::from_seed(seed))
    }

    fn with_rng(id: NodeId, config: Config, rng: CodingRng) -> Result<Self, ProtocolError> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            rng,
            sender: SenderEngine::new(id, config),
            receiver: ReceiverEngine::new(id, config),
            relay: RelayEngine::new(id, config),
            dest_store: GenerationStore::new(),
            relay_store: GenerationStore::new(),
            stats: Stats::default(),
        })
    }

    /// This node's link-layer identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's static configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Event counters accumulated so far.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Accept one outbound packet from the upper layer.
    ///
    /// With coding enabled and a non-control protocol tag, packets buffer
    /// until a full generation exists; the returned generation id (if any)
    /// tells the caller to schedule [`CodedNode::tick`] for it after
    /// `retransmit_interval`. Control traffic and coding-disabled nodes
    /// transmit immediately as plain frames.
    pub fn enqueue(
        &mut self,
        packet: Vec<u8>,
        destination: NodeId,
        protocol: u16,
    ) -> Result<(Vec<Action>, Option<u16>), ProtocolError> {
        if !self.config.coding || protocol == PROTO_CONTROL {
            trace!(%destination, protocol, "passthrough transmit");
            return Ok((
                vec![Action::Transmit(Frame {
                    payload: packet,
                    source: self.id,
                    destination,
                    protocol,
                })],
                None,
            ));
        }

        let started = self
            .sender
            .enqueue(packet, destination, protocol, &mut self.dest_store)?;
        Ok((Vec::new(), started))
    }

    /// Drive one retransmission tick for a generation.
    ///
    /// Returns the actions to execute and whether the caller should
    /// reschedule another tick after `retransmit_interval`.
    pub fn tick(&mut self, generation: u16) -> Result<(Vec<Action>, bool), ProtocolError> {
        match self
            .sender
            .tick(generation, &self.dest_store, &mut self.rng, &mut self.stats)?
        {
            SenderTick::Frame(frame) => Ok((vec![Action::Transmit(frame)], true)),
            SenderTick::Halted => Ok((Vec::new(), false)),
        }
    }

    /// Process one inbound frame, as classified by the link layer.
    ///
    /// Control frames bypass coding and deliver (or are ignored when merely
    /// overheard). Acknowledgements retire our own generations and, when
    /// overheard, retire relayed ones. Coded data goes to the receiver for
    /// destination-addressed frames and to the relay for overheard ones.
    pub fn handle_frame(
        &mut self,
        frame: &Frame,
        disposition: Disposition,
    ) -> Result<Vec<Action>, ProtocolError> {
        if frame.protocol == PROTO_CONTROL {
            return Ok(match disposition {
                Disposition::ForUs => vec![Action::Deliver(frame.payload.clone())],
                Disposition::Overheard => Vec::new(),
            });
        }
        if !self.config.coding {
            return Ok(match disposition {
                Disposition::ForUs => vec![Action::Deliver(frame.payload.clone())],
                Disposition::Overheard => Vec::new(),
            });
        }

        let (header, body) = GenerationHeader::decode(&frame.payload)?;

        if !header.coded {
            // Acknowledgement. One naming our generation halts the sender
            // loop at its next tick whether it was addressed to us or
            // merely overheard; any other retires the relayed generation.
            if header.origin == self.id {
                self.dest_store.mark_decoded(header.generation, self.id);
                debug!(generation = header.generation, "generation acknowledged");
            } else {
                self.relay.observe_ack(&header, &mut self.relay_store);
            }
            return Ok(Vec::new());
        }

        match disposition {
            Disposition::ForUs => self.receiver.handle_data(
                &header,
                body,
                frame.source,
                &mut self.dest_store,
                &mut self.stats,
            ),
            Disposition::Overheard => {
                let relayed = self.relay.handle_overheard(
                    &header,
                    body,
                    frame,
                    &mut self.relay_store,
                    &mut self.rng,
                    &mut self.stats,
                )?;
                Ok(relayed.into_iter().map(Action::Transmit).collect())
            }
        }
    }
}
