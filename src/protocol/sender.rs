use crate::coding::Encoder;
use crate::protocol::config::Config;
use crate::protocol::header::GenerationHeader;
use crate::protocol::link::{Frame, NodeId};
use crate::protocol::stats::Stats;
use crate::protocol::store::GenerationStore;
use crate::protocol::ProtocolError;
use crate::utils::CodingRng;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// One unacknowledged generation in flight.
struct PendingGeneration {
    encoder: Encoder,
    header: GenerationHeader,
    destination: NodeId,
    protocol: u16,
}

/// Result of one retransmission tick.
#[derive(Debug, PartialEq, Eq)]
pub enum SenderTick {
    /// Transmit this frame and reschedule after the retransmit interval
    Frame(Frame),
    /// The generation was acknowledged; the loop stops permanently
    Halted,
}

/// Sender engine: batches outbound packets into generations and keeps each
/// one on the air until acknowledged.
///
/// Reliability is pure coded redundancy: every tick emits a *fresh* random
/// combination of the generation's K packets, and the loop's only stop
/// condition is the decoded flag set by an inbound acknowledgement. There
/// is no per-packet ARQ and no explicit timer cancellation — a tick that
/// fires after the flag is already set observes it and halts.
pub struct SenderEngine {
    local: NodeId,
    config: Config,
    queue: VecDeque<Vec<u8>>,
    next_generation: u16,
    active: HashMap<u16, PendingGeneration>,
}

impl SenderEngine {
    /// Sender for the node `local`.
    pub fn new(local: NodeId, config: Config) -> Self {
        Self {
            local,
            config,
            queue: VecDeque::new(),
            // The reference device numbers generations from 1.
            next_generation: 1,
            active: HashMap::new(),
        }
    }

    /// Packets buffered towards the next generation.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Generations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.active.len()
    }

    /// Buffer one outbound packet of exactly the configured symbol size.
    ///
    /// When the K-th packet arrives the batch is drained into a new
    /// generation: an encoder is built over the block, the next wrapping
    /// generation id is assigned, and its decoded flag is cleared in
    /// `store`. Returns the new generation id so the caller can schedule
    /// the first [`SenderEngine::tick`] after the retransmit interval.
    pub fn enqueue(
        &mut self,
        packet: Vec<u8>,
        destination: NodeId,
        protocol: u16,
        store: &mut GenerationStore,
    ) -> Result<Option<u16>, ProtocolError> {
        if packet.len() != self.config.symbol_size {
            return Err(ProtocolError::PayloadSizeMismatch {
                expected: self.config.symbol_size,
                actual: packet.len(),
            });
        }
        self.queue.push_back(packet);
        if self.queue.len() < self.config.generation_size {
            return Ok(None);
        }

        let k = self.config.generation_size;
        let mut block = Vec::with_capacity(k * self.config.symbol_size);
        for _ in 0..k {
            // Queue length was just checked.
            if let Some(packet) = self.queue.pop_front() {
                block.extend_from_slice(&packet);
            }
        }

        let mut encoder = Encoder::new(k, self.config.symbol_size)?;
        encoder.set_symbols(&block)?;

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let header = GenerationHeader::data(generation, self.local);
        store.clear_decoded(generation, self.local);
        self.active.insert(
            generation,
            PendingGeneration {
                encoder,
                header,
                destination,
                protocol,
            },
        );
        debug!(generation, origin = %self.local, "generation started");
        Ok(Some(generation))
    }

    /// Drive one retransmission tick for `generation`.
    ///
    /// Checks the decoded flag first: once set the pending state is dropped
    /// and every subsequent tick reports [`SenderTick::Halted`]. Otherwise
    /// one freshly coded frame is produced; the caller transmits it and
    /// reschedules.
    pub fn tick(
        &mut self,
        generation: u16,
        store: &GenerationStore,
        rng: &mut CodingRng,
        stats: &mut Stats,
    ) -> Result<SenderTick, ProtocolError> {
        if store.is_decoded(generation, self.local) {
            if self.active.remove(&generation).is_some() {
                debug!(generation, "generation acknowledged, halting rebroadcast");
            }
            return Ok(SenderTick::Halted);
        }
        let pending = match self.active.get(&generation) {
            Some(pending) => pending,
            // Unknown or already halted: nothing to send.
            None => return Ok(SenderTick::Halted),
        };

        let mut payload = pending.header.encode().to_vec();
        payload.extend_from_slice(&pending.encoder.encode(rng)?);
        stats.sent_coded += 1;
        debug!(generation, sent = stats.sent_coded, "rebroadcast coded symbol");

        Ok(SenderTick::Frame(Frame {
            payload,
            source: self.local,
            destination: pending.destination,
            protocol: pending.protocol,
        }))
    }
}
