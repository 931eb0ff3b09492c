use crate::coding::gf256::{self, Gf256};
use crate::coding::CodingError;
use crate::utils::CodingRng;

/// Full-vector RLNC decoder for one generation.
///
/// Absorbs `[coding vector | coded symbol]` payloads under incremental
/// Gaussian elimination: each innovative payload claims a pivot column and
/// raises the rank by one, dependent payloads reduce to zero and are
/// discarded. At rank = `symbols` the original block is recoverable via
/// [`Decoder::copy_symbols`].
///
/// A decoder doubles as a recoder: [`Decoder::recode`] emits a fresh random
/// combination of whatever rows it currently holds, valid for further
/// relaying even when the decoder itself is nowhere near complete.
#[derive(Debug)]
pub struct Decoder {
    /// Number of source symbols in the generation
    symbols: usize,
    /// Size of each symbol in bytes
    symbol_size: usize,
    /// Reduced coding-vector rows, in absorption order
    rows: Vec<Vec<Gf256>>,
    /// Coded-symbol rows parallel to `rows`
    row_data: Vec<Vec<u8>>,
    /// Pivot column -> index into `rows`
    pivots: Vec<Option<usize>>,
    rank: usize,
}

impl Decoder {
    /// Create a decoder sized for `symbols` source symbols of `symbol_size`
    /// bytes each.
    pub fn new(symbols: usize, symbol_size: usize) -> Result<Self, CodingError> {
        if symbols == 0 || symbol_size == 0 {
            return Err(CodingError::InvalidParameters);
        }
        Ok(Self {
            symbols,
            symbol_size,
            rows: Vec::with_capacity(symbols),
            row_data: Vec::with_capacity(symbols),
            pivots: vec![None; symbols],
            rank: 0,
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

    /// Size of every accepted payload: coding vector plus coded symbol.
    pub fn payload_size(&self) -> usize {
        self.symbols + self.symbol_size
    }

    /// Total size of the reconstructed block in bytes.
    pub fn block_size(&self) -> usize {
        self.symbols * self.symbol_size
    }

    /// Number of linearly independent payloads absorbed so far.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether the generation is fully recoverable (rank reached `symbols`).
    pub fn is_complete(&self) -> bool {
        self.rank == self.symbols
    }

    /// Absorb one coded payload.
    ///
    /// Returns `Ok(true)` if the payload was innovative (raised the rank),
    /// `Ok(false)` if it was linearly dependent on what is already held.
    /// Dependent payloads leave the decoder state untouched, so feeding
    /// duplicates is harmless.
    pub fn decode(&mut self, payload: &[u8]) -> Result<bool, CodingError> {
        if payload.len() != self.payload_size() {
            return Err(CodingError::InvalidSymbolSize {
                expected: self.payload_size(),
                actual: payload.len(),
            });
        }

        let (vector, body) = payload.split_at(self.symbols);
        let mut coeffs: Vec<Gf256> = vector.iter().map(|&b| Gf256(b)).collect();
        let mut data = body.to_vec();

        // Eliminate against every claimed pivot, in column order. After the
        // subtraction at column `col` the candidate is zero there, so each
        // pass can only move the leading coefficient rightwards.
        for col in 0..self.symbols {
            if coeffs[col].is_zero() {
                continue;
            }
            match self.pivots[col] {
                Some(row) => {
                    let factor = coeffs[col];
                    let (pivot_coeffs, pivot_data) = (&self.rows[row], &self.row_data[row]);
                    for c in col..self.symbols {
                        let delta = pivot_coeffs[c] * factor;
                        coeffs[c] -= delta;
                    }
                    gf256::add_scaled(&mut data, pivot_data, factor);
                }
                None => {
                    // New pivot: normalize so the leading coefficient is one
                    // and store the row.
                    let inv = coeffs[col]
                        .invert()
                        .ok_or(CodingError::InvalidParameters)?;
                    for c in &mut coeffs {
                        *c *= inv;
                    }
                    gf256::scale(&mut data, inv);

                    self.pivots[col] = Some(self.rows.len());
                    self.rows.push(coeffs);
                    self.row_data.push(data);
                    self.rank += 1;
                    return Ok(true);
                }
            }
        }

        // Reduced to zero: linearly dependent.
        Ok(false)
    }

    /// Emit a fresh random combination of the rows held so far.
    ///
    /// The output is a valid payload for this generation whether or not the
    /// decoder is complete; this is how relays contribute coding gain
    /// without decoding.
    pub fn recode(&self, rng: &mut CodingRng) -> Result<Vec<u8>, CodingError> {
        if self.rows.is_empty() {
            return Err(CodingError::NoSymbolsHeld);
        }

        let mut out_coeffs = vec![Gf256::ZERO; self.symbols];
        let mut out_data = vec![0u8; self.symbol_size];
        for (row, data) in self.rows.iter().zip(&self.row_data) {
            let alpha = rng.coefficient();
            if alpha.is_zero() {
                continue;
            }
            for (out, held) in out_coeffs.iter_mut().zip(row) {
                *out += *held * alpha;
            }
            gf256::add_scaled(&mut out_data, data, alpha);
        }

        let mut payload = Vec::with_capacity(self.payload_size());
        payload.extend(out_coeffs.iter().map(|c| c.0));
        payload.extend_from_slice(&out_data);
        Ok(payload)
    }

    /// Reconstruct the original block, symbols concatenated in source order.
    ///
    /// Only valid once [`Decoder::is_complete`] holds; runs the deferred
    /// back-substitution pass and is idempotent thereafter.
    pub fn copy_symbols(&mut self) -> Result<Vec<u8>, CodingError> {
        if !self.is_complete() {
            return Err(CodingError::NotComplete);
        }

        // Back-substitution: clear every entry above each pivot, highest
        // column first. Rows are triangular after absorption, so afterwards
        // each row holds exactly one source symbol.
        for col in (0..self.symbols).rev() {
            let pivot_row = match self.pivots[col] {
                Some(row) => row,
                None => return Err(CodingError::NotComplete),
            };
            let pivot_data = self.row_data[pivot_row].clone();
            for other_col in 0..col {
                let other_row = match self.pivots[other_col] {
                    Some(row) => row,
                    None => return Err(CodingError::NotComplete),
                };
                let factor = self.rows[other_row][col];
                if factor.is_zero() {
                    continue;
                }
                for c in col..self.symbols {
                    let delta = self.rows[pivot_row][c] * factor;
                    self.rows[other_row][c] -= delta;
                }
                gf256::add_scaled(&mut self.row_data[other_row], &pivot_data, factor);
            }
        }

        let mut block = Vec::with_capacity(self.block_size());
        for col in 0..self.symbols {
            let row = self.pivots[col].ok_or(CodingError::NotComplete)?;
            block.extend_from_slice(&self.row_data[row]);
        }
        Ok(block)
    }
}
