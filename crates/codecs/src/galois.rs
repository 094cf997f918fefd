//! Galois field arithmetic for Reed-Solomon
//!
//! GF(2^m) represented through discrete-log tables: `alpha_to[i]` is the
//! field element alpha^i and `index_of[x]` its logarithm. Symbols are
//! carried in bytes, so `m` ranges from 1 to 8.

use crate::{CodecError, Result};

/// GF(2^m) arithmetic tables.
///
/// Construction walks the multiplicative group generated by `x` modulo the
/// primitive polynomial; a polynomial whose cycle does not cover the whole
/// group (or returns to 1 early) is rejected.
#[derive(Debug, Clone)]
pub struct GaloisField {
    symbol_size: u32,
    size: usize, // 2^m - 1
    alpha_to: Vec<u8>,
    index_of: Vec<usize>,
}

impl GaloisField {
    /// Build the field tables.
    ///
    /// `primitive_polynomial` includes the x^m term, e.g. `0x187` for the
    /// CCSDS GF(256) polynomial x^8+x^7+x^2+x+1.
    pub fn new(symbol_size: u32, primitive_polynomial: u32) -> Result<Self> {
        if symbol_size == 0 || symbol_size > 8 {
            return Err(CodecError::Config {
                msg: format!("symbol size {symbol_size} outside 1..=8"),
            });
        }
        if primitive_polynomial >> symbol_size != 1 {
            return Err(CodecError::Config {
                msg: format!(
                    "primitive polynomial {primitive_polynomial:#x} does not have degree {symbol_size}"
                ),
            });
        }

        let size = (1usize << symbol_size) - 1;
        let mut alpha_to = vec![0u8; size];
        let mut index_of = vec![0usize; size + 1];

        let mut sr: u32 = 1;
        for i in 0..size {
            alpha_to[i] = sr as u8;
            index_of[sr as usize] = i;
            sr <<= 1;
            if sr & (1 << symbol_size) != 0 {
                sr ^= primitive_polynomial;
            }
            sr &= size as u32;
            if sr == 1 && i != size - 1 {
                return Err(CodecError::Config {
                    msg: format!(
                        "polynomial {primitive_polynomial:#x} cycles after {} steps, field needs {size}",
                        i + 1
                    ),
                });
            }
        }
        if sr != 1 {
            return Err(CodecError::Config {
                msg: format!(
                    "polynomial {primitive_polynomial:#x} does not generate the multiplicative group"
                ),
            });
        }

        Ok(Self {
            symbol_size,
            size,
            alpha_to,
            index_of,
        })
    }

    /// Bits per symbol
    pub fn symbol_size(&self) -> u32 {
        self.symbol_size
    }

    /// Order of the multiplicative group, 2^m - 1
    pub fn size(&self) -> usize {
        self.size
    }

    /// alpha^i, exponent taken modulo the group order
    pub fn exp(&self, i: usize) -> u8 {
        self.alpha_to[i % self.size]
    }

    /// Discrete logarithm of a nonzero element
    pub fn log(&self, a: u8) -> usize {
        debug_assert!(a != 0, "log of zero");
        self.index_of[a as usize]
    }

    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.alpha_to[(self.index_of[a as usize] + self.index_of[b as usize]) % self.size]
    }

    pub fn div(&self, a: u8, b: u8) -> u8 {
        debug_assert!(b != 0, "division by zero");
        if a == 0 {
            return 0;
        }
        self.alpha_to
            [(self.index_of[a as usize] + self.size - self.index_of[b as usize]) % self.size]
    }

    pub fn inv(&self, a: u8) -> u8 {
        debug_assert!(a != 0, "inverse of zero");
        self.alpha_to[(self.size - self.index_of[a as usize]) % self.size]
    }

    pub fn pow(&self, a: u8, p: usize) -> u8 {
        if a == 0 {
            return 0;
        }
        self.alpha_to[(self.index_of[a as usize] * p) % self.size]
    }

    /// Evaluate a polynomial (coefficient of x^j at index j) at `x`.
    pub fn poly_eval(&self, poly: &[u8], x: u8) -> u8 {
        let mut acc = 0u8;
        let mut x_pow = 1u8;
        for &coeff in poly {
            acc ^= self.mul(coeff, x_pow);
            x_pow = self.mul(x_pow, x);
        }
        acc
    }
}
