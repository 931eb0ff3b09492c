#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod coding;
pub mod protocol;
pub mod utils;

pub use coding::{CodingError, Decoder, Encoder, Gf256};
pub use protocol::{CodedNode, Config, NodeId, ProtocolError};
