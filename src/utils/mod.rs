//! Utility functions and helpers

/// Random number generation for coding and relay decisions
pub mod rand;

pub use rand::CodingRng;
