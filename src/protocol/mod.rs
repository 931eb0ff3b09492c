//! The network-coded relaying protocol.
//!
//! A [`CodedNode`] is one node's worth of protocol state: the sender engine
//! batching outbound packets into generations and rebroadcasting coded
//! symbols of each until acknowledged, the receiver engine decoding
//! destination-addressed traffic and acking completed generations, and the
//! relay engine recoding overheard traffic from other origins. All three
//! consult keyed [`GenerationStore`]s; nothing in here performs IO — every
//! entry point returns [`Action`]s for the embedder's link layer.

/// Static per-node protocol parameters
pub mod config;
/// Generation header wire codec
pub mod header;
/// Link-layer seam: identities, frames, and engine actions
pub mod link;
/// The per-node protocol engine
pub mod node;
/// Destination-side decode, deliver, and acknowledge path
pub mod receiver;
/// Overheard-traffic recode/forward path
pub mod relay;
/// Sender-side generation batching and retransmission loop
pub mod sender;
/// Protocol event counters
pub mod stats;
/// Keyed decoder and decoded-flag tables
pub mod store;

pub use config::Config;
pub use header::GenerationHeader;
pub use link::{Action, Disposition, Frame, NodeId, PROTO_ACK, PROTO_CONTROL};
pub use node::CodedNode;
pub use stats::Stats;
pub use store::GenerationStore;

use crate::coding::CodingError;
use thiserror::Error;

/// Error type for the protocol engines
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame too short to carry a generation header
    #[error("truncated generation header: {0} bytes")]
    TruncatedHeader(usize),

    /// Payload length disagrees with what the decoder for this generation
    /// expects; indicates a desynchronized or corrupted header
    #[error("payload size mismatch: expected {expected}, got {actual}")]
    PayloadSizeMismatch {
        /// Expected payload length
        expected: usize,
        /// Observed payload length
        actual: usize,
    },

    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Failure inside the coding primitive
    #[error(transparent)]
    Coding(#[from] CodingError),
}
