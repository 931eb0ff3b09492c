use crate::coding::gf256::{self, Gf256};
use crate::coding::CodingError;
use crate::utils::CodingRng;

/// Full-vector RLNC encoder for one generation.
///
/// Holds the generation's source block split into `symbols` rows and emits
/// payloads of the form `[coding vector | coded symbol]`, each built from a
/// fresh draw of random coefficients. Two encodes of the same block are
/// therefore (almost always) distinct linear combinations, which is what the
/// sender's retransmission loop relies on for coded redundancy.
#[derive(Debug)]
pub struct Encoder {
    /// Number of source symbols in the generation
    symbols: usize,
    /// Size of each symbol in bytes
    symbol_size: usize,
    /// Original data split into symbols
    data: Vec<Vec<u8>>,
}

impl Encoder {
    /// Create an encoder sized for `symbols` source symbols of `symbol_size`
    /// bytes each.
    pub fn new(symbols: usize, symbol_size: usize) -> Result<Self, CodingError> {
        if symbols == 0 || symbol_size == 0 {
            return Err(CodingError::InvalidParameters);
        }
        Ok(Self {
            symbols,
            symbol_size,
            data: Vec::with_capacity(symbols),
        })
    }

    /// Number of source symbols.
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Size of each source symbol in bytes.
    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    /// Total size of the source block in bytes.
    pub fn block_size(&self) -> usize {
        self.symbols * self.symbol_size
    }

    /// Size of every emitted payload: coding vector plus coded symbol.
    pub fn payload_size(&self) -> usize {
        self.symbols + self.symbol_size
    }

    /// Load the generation's source block, splitting it into symbols.
    pub fn set_symbols(&mut self, block: &[u8]) -> Result<(), CodingError> {
        if block.len() != self.block_size() {
            return Err(CodingError::InvalidDataSize {
                expected: self.block_size(),
                actual: block.len(),
            });
        }
        self.data.clear();
        for chunk in block.chunks_exact(self.symbol_size) {
            self.data.push(chunk.to_vec());
        }
        Ok(())
    }

    /// Emit one coded payload from a fresh draw of random coefficients.
    pub fn encode(&self, rng: &mut CodingRng) -> Result<Vec<u8>, CodingError> {
        if self.data.is_empty() {
            return Err(CodingError::NoDataSet);
        }

        let coeffs = rng.coefficients(self.symbols);
        let mut payload = vec![0u8; self.payload_size()];
        let (vector, body) = payload.split_at_mut(self.symbols);
        for (slot, coeff) in vector.iter_mut().zip(&coeffs) {
            *slot = coeff.0;
        }
        for (coeff, row) in coeffs.iter().zip(&self.data) {
            gf256::add_scaled(body, row, *coeff);
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::Gf256;

    #[test]
    fn test_encoder_invalid_parameters() {
        assert_eq!(Encoder::new(0, 16).unwrap_err(), CodingError::InvalidParameters);
        assert_eq!(Encoder::new(4, 0).unwrap_err(), CodingError::InvalidParameters);
    }

    #[test]
    fn test_encoder_sizes() {
        let encoder = Encoder::new(4, 16).unwrap();
        assert_eq!(encoder.symbols(), 4);
        assert_eq!(encoder.symbol_size(), 16);
        assert_eq!(encoder.block_size(), 64);
        assert_eq!(encoder.payload_size(), 20);
    }

    #[test]
    fn test_set_symbols_wrong_size() {
        let mut encoder = Encoder::new(3, 4).unwrap();
        let err = encoder.set_symbols(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            CodingError::InvalidDataSize {
                expected: 12,
                actual: 3
            }
        );
    }

    #[test]
    fn test_encode_without_data() {
        let encoder = Encoder::new(2, 4).unwrap();
        let mut rng = CodingRng::from_seed([0; 32]);
        assert_eq!(encoder.encode(&mut rng).unwrap_err(), CodingError::NoDataSet);
    }

    #[test]
    fn test_encode_payload_layout() {
        let mut encoder = Encoder::new(2, 4).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let mut rng = CodingRng::from_seed([7; 32]);
        let payload = encoder.encode(&mut rng).unwrap();
        assert_eq!(payload.len(), 6);

        // Recompute the combination from the embedded coding vector.
        let (vector, body) = payload.split_at(2);
        let mut expected = vec![0u8; 4];
        crate::coding::gf256::add_scaled(&mut expected, &[1, 2, 3, 4], Gf256(vector[0]));
        crate::coding::gf256::add_scaled(&mut expected, &[5, 6, 7, 8], Gf256(vector[1]));
        assert_eq!(body, &expected[..]);
    }

    #[test]
    fn test_encode_deterministic_with_seed() {
        let block: Vec<u8> = (0..12).collect();

        let mut a = Encoder::new(3, 4).unwrap();
        let mut b = Encoder::new(3, 4).unwrap();
        a.set_symbols(&block).unwrap();
        b.set_symbols(&block).unwrap();

        let mut rng_a = CodingRng::from_seed([42; 32]);
        let mut rng_b = CodingRng::from_seed([42; 32]);
        assert_eq!(a.encode(&mut rng_a).unwrap(), b.encode(&mut rng_b).unwrap());
    }

    #[test]
    fn test_encode_fresh_combinations() {
        let mut encoder = Encoder::new(3, 4).unwrap();
        encoder.set_symbols(&(0..12).collect::<Vec<u8>>()).unwrap();

        let mut rng = CodingRng::from_seed([1; 32]);
        let first = encoder.encode(&mut rng).unwrap();
        let second = encoder.encode(&mut rng).unwrap();
        assert_ne!(first, second);
    }
}
