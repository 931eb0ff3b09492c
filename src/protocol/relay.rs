use crate::protocol::config::Config;
use crate::protocol::header::GenerationHeader;
use crate::protocol::link::{Frame, NodeId};
use crate::protocol::stats::Stats;
use crate::protocol::store::GenerationStore;
use crate::protocol::ProtocolError;
use crate::utils::CodingRng;
use tracing::{debug, trace};

/// Relay engine: the overheard-traffic recode/forward path.
///
/// A relay keeps its own decoder per `(generation, origin)` — separate
/// state from the destination path, because a relay may sit within earshot
/// of many origins and must not conflate their rank progress. Every
/// eligible overheard symbol is absorbed; whether anything is transmitted
/// in response is a stateless per-frame coin flip against `relay_activity`.
///
/// Relayed frames carry the *original* generation header, origin included,
/// so downstream nodes cannot tell a relayed frame from a direct one.
pub struct RelayEngine {
    local: NodeId,
    config: Config,
}

impl RelayEngine {
    /// Relay for the node `local`.
    pub fn new(local: NodeId, config: Config) -> Self {
        Self { local, config }
    }

    /// Process one overheard coded data frame; returns the frame to
    /// transmit, if any.
    ///
    /// The caller has already established the frame is overheard,
    /// non-control, and carries the coding flag. Frames authored by this
    /// node and generations whose acknowledgement we have observed are
    /// never relayed.
    pub fn handle_overheard(
        &mut self,
        header: &GenerationHeader,
        body: &[u8],
        frame: &Frame,
        store: &mut GenerationStore,
        rng: &mut CodingRng,
        stats: &mut Stats,
    ) -> Result<Option<Frame>, ProtocolError> {
        // Never relay your own traffic back into the air.
        if header.origin == self.local {
            return Ok(None);
        }
        if store.is_decoded(header.generation, header.origin) {
            trace!(
                generation = header.generation,
                origin = %header.origin,
                "generation already acknowledged, not relaying"
            );
            return Ok(None);
        }

        let decoder = store.decoder_for(
            header.generation,
            header.origin,
            self.config.generation_size,
            self.config.symbol_size,
        )?;
        if body.len() != decoder.payload_size() {
            return Err(ProtocolError::PayloadSizeMismatch {
                expected: decoder.payload_size(),
                actual: body.len(),
            });
        }

        // Absorb unconditionally: the relay's subspace keeps growing even
        // while the suppression draw keeps it quiet.
        decoder.decode(body)?;

        let out_body = if self.config.recode {
            decoder.recode(rng)?
        } else {
            // Plain store-and-forward.
            body.to_vec()
        };

        let draw = rng.roll_percent();
        if draw <= self.config.relay_activity {
            stats.relay_suppressed += 1;
            trace!(draw, activity = self.config.relay_activity, "relay suppressed");
            return Ok(None);
        }

        let mut payload = header.encode().to_vec();
        payload.extend_from_slice(&out_body);
        stats.relayed += 1;
        debug!(
            generation = header.generation,
            origin = %header.origin,
            recoded = self.config.recode,
            relayed = stats.relayed,
            "relaying overheard symbol"
        );
        Ok(Some(Frame {
            payload,
            source: self.local,
            destination: frame.destination,
            protocol: frame.protocol,
        }))
    }

    /// Note an overheard acknowledgement: the generation is done, stop
    /// contributing to it.
    pub fn observe_ack(&mut self, header: &GenerationHeader, store: &mut GenerationStore) {
        if store.mark_decoded(header.generation, header.origin) {
            debug!(
                generation = header.generation,
                origin = %header.origin,
                "overheard acknowledgement, retiring relayed generation"
            );
        }
    }
}
