//! Full-vector RLNC codec over GF(2^8).
//!
//! Wire payloads are laid out as `[coding vector: K bytes][coded symbol]`,
//! so every payload is self-describing: a decoder reads which linear
//! combination of the generation's K source symbols it holds straight from
//! the payload, which is what lets relays recode traffic they cannot decode.

/// RLNC decoder with incremental Gaussian elimination and recoding
pub mod decoder;
/// RLNC encoder producing fresh random combinations of a source block
pub mod encoder;
/// Byte-field arithmetic shared by the codec
pub mod gf256;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use gf256::Gf256;

use thiserror::Error;

/// Error type for encoding and decoding operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodingError {
    /// Zero symbols or zero symbol size
    #[error("invalid codec parameters")]
    InvalidParameters,

    /// Payload length disagrees with the codec's expected payload size
    #[error("invalid payload size: expected {expected}, got {actual}")]
    InvalidSymbolSize {
        /// The codec's `payload_size()`
        expected: usize,
        /// The offered payload length
        actual: usize,
    },

    /// Source block length disagrees with `symbols * symbol_size`
    #[error("invalid data size: expected {expected}, got {actual}")]
    InvalidDataSize {
        /// The codec's `block_size()`
        expected: usize,
        /// The offered block length
        actual: usize,
    },

    /// Encoding requested before any source block was set
    #[error("no data set")]
    NoDataSet,

    /// Recoding requested before any symbol was absorbed
    #[error("no symbols held")]
    NoSymbolsHeld,

    /// Reconstruction requested before reaching full rank
    #[error("decoder is not complete")]
    NotComplete,
}
