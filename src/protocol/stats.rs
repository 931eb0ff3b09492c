/// Protocol event counters for one node.
///
/// Pure observability: the engines update these as they go and nothing
/// reads them back for control decisions. Mirrors the counter battery the
/// reference implementation logged per event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Coded data frames emitted by the sender loop
    pub sent_coded: u64,
    /// Coded data frames accepted by the receiver path
    pub received_coded: u64,
    /// Received frames whose link-layer source was the generation origin
    pub from_origin: u64,
    /// Received frames that arrived via a relay hop
    pub from_relay: u64,
    /// Symbols that raised a destination decoder's rank
    pub innovative: u64,
    /// Symbols that were linearly dependent on what was already held
    pub redundant: u64,
    /// Generations fully decoded and delivered upward
    pub generations_decoded: u64,
    /// Original packets delivered to the upper layer
    pub packets_delivered: u64,
    /// Acknowledgements transmitted, duplicates included
    pub acks_sent: u64,
    /// Self-authored frames observed looped back
    pub own_echoes: u64,
    /// Frames recoded or forwarded by the relay path
    pub relayed: u64,
    /// Eligible overheard frames dropped by the suppression draw
    pub relay_suppressed: u64,
}
