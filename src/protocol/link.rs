use std::fmt;

/// Protocol tag for control (address-resolution) traffic, which bypasses the
/// coding path entirely in both directions.
pub const PROTO_CONTROL: u16 = 0x0806;

/// Protocol tag stamped on acknowledgement frames.
pub const PROTO_ACK: u16 = 100;

/// MAC-48-style node identifier.
///
/// Identifies a node on the broadcast medium and, carried in the generation
/// header, the *origin* that authored a generation — which relaying
/// preserves across any number of hops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub [u8; 6]);

impl NodeId {
    /// The all-ones broadcast identity.
    pub const BROADCAST: NodeId = NodeId([0xff; 6]);

    /// Raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl From<[u8; 6]> for NodeId {
    fn from(bytes: [u8; 6]) -> Self {
        NodeId(bytes)
    }
}

/// One frame on the medium, as the link layer hands it up or accepts it for
/// transmission. `source` and `destination` are link-layer addresses of the
/// current hop; the authoring origin of coded traffic lives in the
/// generation header, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame body (generation header plus coded payload, for coded traffic)
    pub payload: Vec<u8>,
    /// Transmitting node of this hop
    pub source: NodeId,
    /// Addressed recipient of this hop
    pub destination: NodeId,
    /// Link-layer protocol tag
    pub protocol: u16,
}

/// How the link layer classified an inbound frame for us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Addressed to this node (or broadcast)
    ForUs,
    /// Captured promiscuously, addressed elsewhere
    Overheard,
}

/// An effect requested by the engine, executed by the embedder.
///
/// The engines never touch the medium or the upper layer directly: frame
/// handlers and ticks return a list of these instead. A failed transmit is
/// ordinary medium loss and must not be reported back into the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Hand this frame to the link layer for transmission
    Transmit(Frame),
    /// Deliver one reconstructed packet to the upper layer
    Deliver(Vec<u8>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        let id = NodeId([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        assert_eq!(id.to_string(), "00:1b:44:11:3a:b7");
    }

    #[test]
    fn test_broadcast_constant() {
        assert_eq!(NodeId::BROADCAST.as_bytes(), &[0xff; 6]);
    }
}
