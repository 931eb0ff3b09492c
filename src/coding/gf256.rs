use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

/// An element of GF(2^8) with reduction polynomial x^8 + x^4 + x^3 + x + 1.
///
/// Addition is XOR; multiplication is carry-less polynomial multiplication
/// reduced modulo 0x11B. This is the byte field that coding vectors and
/// coded symbols are expressed over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Gf256(pub u8);

/// The reduction polynomial, minus the implicit x^8 term.
const POLY: u8 = 0x1B;

impl Gf256 {
    /// The additive identity.
    pub const ZERO: Self = Gf256(0);
    /// The multiplicative identity.
    pub const ONE: Self = Gf256(1);

    /// Whether this element is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiplicative inverse, or `None` for zero.
    ///
    /// Uses a^254 = a^-1, which holds for every nonzero element of GF(2^8).
    pub fn invert(self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let mut acc = Gf256::ONE;
        let mut base = self;
        let mut exp = 254u32;
        while exp > 0 {
            if exp & 1 == 1 {
                acc *= base;
            }
            base *= base;
            exp >>= 1;
        }
        Some(acc)
    }
}

impl Add for Gf256 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Gf256(self.0 ^ rhs.0)
    }
}

impl AddAssign for Gf256 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

// Subtraction coincides with addition in characteristic 2.
impl Sub for Gf256 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Gf256(self.0 ^ rhs.0)
    }
}

impl SubAssign for Gf256 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Mul for Gf256 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut a = self.0;
        let mut b = rhs.0;
        let mut product = 0u8;
        while b != 0 {
            if b & 1 == 1 {
                product ^= a;
            }
            let carry = a & 0x80;
            a <<= 1;
            if carry != 0 {
                a ^= POLY;
            }
            b >>= 1;
        }
        Gf256(product)
    }
}

impl MulAssign for Gf256 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl From<u8> for Gf256 {
    fn from(value: u8) -> Self {
        Gf256(value)
    }
}

/// `dst += coeff * src`, element-wise over byte slices of equal length.
///
/// The workhorse of both encoding and elimination; a zero coefficient is a
/// no-op and a unit coefficient degenerates to XOR.
pub fn add_scaled(dst: &mut [u8], src: &[u8], coeff: Gf256) {
    debug_assert_eq!(dst.len(), src.len());
    if coeff.is_zero() {
        return;
    }
    if coeff == Gf256::ONE {
        for (d, s) in dst.iter_mut().zip(src) {
            *d ^= *s;
        }
        return;
    }
    for (d, s) in dst.iter_mut().zip(src) {
        *d = (Gf256(*d) + Gf256(*s) * coeff).0;
    }
}

/// Scale a byte slice in place by a field element.
pub fn scale(row: &mut [u8], coeff: Gf256) {
    if coeff == Gf256::ONE {
        return;
    }
    for byte in row.iter_mut() {
        *byte = (Gf256(*byte) * coeff).0;
    }
}
