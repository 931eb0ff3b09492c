use crate::protocol::ProtocolError;
use std::time::Duration;

/// Static per-node protocol parameters.
///
/// Fixed at node construction and never renegotiated at runtime. Defaults
/// mirror the reference device attributes: 30-symbol generations of 128
/// bytes, half-second retransmission, relaying fully suppressed until the
/// embedder opts in by lowering `relay_activity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Generation size K: packets batched and encoded together
    pub generation_size: usize,
    /// Fixed size of every packet/symbol in bytes
    pub symbol_size: usize,
    /// Delay between retransmission ticks of an unacknowledged generation
    pub retransmit_interval: Duration,
    /// Relay suppression percentage 0-100: a relay transmits only when a
    /// uniform draw in 1..=100 exceeds this, so 100 silences relays and 0
    /// makes them forward every eligible frame
    pub relay_activity: u8,
    /// Recode overheard traffic (true) or plain store-and-forward (false)
    pub recode: bool,
    /// Master switch: with coding off the node is a plain passthrough
    pub coding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation_size: 30,
            symbol_size: 128,
            retransmit_interval: Duration::from_millis(500),
            relay_activity: 100,
            recode: true,
            coding: true,
        }
    }
}

impl Config {
    /// Reject parameter combinations the engines cannot run with.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.generation_size == 0 {
            return Err(ProtocolError::InvalidConfig("generation_size must be nonzero"));
        }
        if self.symbol_size == 0 {
            return Err(ProtocolError::InvalidConfig("symbol_size must be nonzero"));
        }
        if self.relay_activity > 100 {
            return Err(ProtocolError::InvalidConfig("relay_activity must be 0-100"));
        }
        Ok(())
    }
}
