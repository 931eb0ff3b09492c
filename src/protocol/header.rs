use crate::protocol::link::NodeId;
use crate::protocol::ProtocolError;

/// Serialized header length: 4-byte base plus the embedded origin address.
pub const HEADER_LEN: usize = 10;

const FLAG_CODED: u8 = 0x01;

/// Generation header carried in front of every coded frame.
///
/// Base wire layout is 4 bytes — generation id (big-endian u16), a flags
/// byte whose low bit is the coding-enabled flag, and a reserved byte —
/// followed by the 6-byte origin identifier, embedded explicitly because
/// relayed frames keep the origin while the link-layer source address
/// changes hop by hop.
///
/// Acknowledgement frames reuse this header with `coded` cleared; that is
/// the only thing distinguishing an ack from data on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationHeader {
    /// Generation identifier, assigned monotonically per sender (wraps)
    pub generation: u16,
    /// Node that authored this generation, preserved through relaying
    pub origin: NodeId,
    /// Coding-enabled flag; cleared exactly on acknowledgement frames
    pub coded: bool,
}

impl GenerationHeader {
    /// Header for a coded data frame of `generation` authored by `origin`.
    pub fn data(generation: u16, origin: NodeId) -> Self {
        Self {
            generation,
            origin,
            coded: true,
        }
    }

    /// The matching acknowledgement header: same generation and origin,
    /// coding flag cleared.
    pub fn ack(&self) -> Self {
        Self {
            coded: false,
            ..*self
        }
    }

    /// Serialize to the fixed wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&self.generation.to_be_bytes());
        if self.coded {
            buf[2] |= FLAG_CODED;
        }
        // buf[3] reserved
        buf[4..10].copy_from_slice(&self.origin.0);
        buf
    }

    /// Parse a header off the front of `buf`, returning it together with
    /// the remaining payload.
    pub fn decode(buf: &[u8]) -> Result<(Self, &[u8]), ProtocolError> {
        if buf.len() < HEADER_LEN {
            return Err(ProtocolError::TruncatedHeader(buf.len()));
        }
        let generation = u16::from_be_bytes([buf[0], buf[1]]);
        let coded = buf[2] & FLAG_CODED != 0;
        let mut origin = [0u8; 6];
        origin.copy_from_slice(&buf[4..10]);
        Ok((
            Self {
                generation,
                origin: NodeId(origin),
                coded,
            },
            &buf[HEADER_LEN..],
        ))
    }
}
