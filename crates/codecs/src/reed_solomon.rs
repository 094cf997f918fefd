//! Reed-Solomon codec
//!
//! Systematic encoder and errors-only decoder over GF(2^m), configurable in
//! symbol size, primitive polynomial, root placement and shortening. The
//! decoder runs Berlekamp-Massey for the error locator polynomial, a Chien
//! search for the error positions and Forney's algorithm for the
//! magnitudes, correcting the received word in place.
//!
//! The CCSDS codes RS(255,223) and RS(255,239) are available as presets
//! (here in the conventional alpha^11 root spacing with first root 112).

use crate::galois::GaloisField;
use crate::{CodecError, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Reed-Solomon code parameters.
///
/// Immutable and validated once by [`ReedSolomon::new`]; a value that fails
/// validation is permanently unusable. `coded_bytes` is the maximum message
/// length, `num_roots` the parity symbol count, and `pad` the number of
/// implicit leading zero symbols that shorten the natural code length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReedSolomonConfig {
    /// Bits per symbol (1..=8)
    pub symbol_size: u32,
    /// Field generator polynomial including the x^m term
    pub primitive_polynomial: u32,
    /// Index of the first consecutive generator root
    pub first_consecutive_root: usize,
    /// Spacing between consecutive generator roots
    pub generator_root_gap: usize,
    /// Maximum message bytes per codeword
    pub coded_bytes: usize,
    /// Parity symbols appended per codeword
    pub num_roots: usize,
    /// Implicit leading zero symbols
    pub pad: usize,
}

impl ReedSolomonConfig {
    /// CCSDS RS(255,223): 32 parity symbols, corrects 16 symbol errors.
    pub fn ccsds_255_223() -> Self {
        Self {
            symbol_size: 8,
            primitive_polynomial: 0x187,
            first_consecutive_root: 112,
            generator_root_gap: 11,
            coded_bytes: 223,
            num_roots: 32,
            pad: 0,
        }
    }

    /// CCSDS RS(255,239): 16 parity symbols, corrects 8 symbol errors.
    pub fn ccsds_255_239() -> Self {
        Self {
            symbol_size: 8,
            primitive_polynomial: 0x187,
            first_consecutive_root: 112,
            generator_root_gap: 11,
            coded_bytes: 239,
            num_roots: 16,
            pad: 0,
        }
    }

    /// Maximum symbol errors the code corrects
    pub fn correctable(&self) -> usize {
        self.num_roots / 2
    }
}

/// Number of corrections applied by a successful decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Corrections {
    /// Symbols changed
    pub symbols: usize,
    /// Bits changed across those symbols
    pub bits: usize,
}

/// Reed-Solomon encoder and decoder for one configuration.
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    config: ReedSolomonConfig,
    gf: GaloisField,
    /// Generator polynomial, coefficient of x^j at index j, monic
    genpoly: Vec<u8>,
    /// Inverse of the root gap modulo the group order
    gap_inverse: usize,
}

impl ReedSolomon {
    /// Validate the configuration and build the field and generator tables.
    pub fn new(config: ReedSolomonConfig) -> Result<Self> {
        let gf = GaloisField::new(config.symbol_size, config.primitive_polynomial)?;
        let nn = gf.size();

        if config.first_consecutive_root > nn {
            return Err(CodecError::Config {
                msg: format!(
                    "first consecutive root {} outside field of order {nn}",
                    config.first_consecutive_root
                ),
            });
        }
        if config.generator_root_gap == 0 || config.generator_root_gap > nn {
            return Err(CodecError::Config {
                msg: format!(
                    "generator root gap {} outside 1..={nn}",
                    config.generator_root_gap
                ),
            });
        }
        if config.num_roots >= nn + 1 {
            return Err(CodecError::Config {
                msg: format!("{} roots do not fit a length-{nn} code", config.num_roots),
            });
        }
        if config.pad >= nn - config.num_roots {
            return Err(CodecError::Config {
                msg: format!("pad {} leaves no room for data symbols", config.pad),
            });
        }
        if config.coded_bytes + config.num_roots + config.pad != nn {
            return Err(CodecError::Config {
                msg: format!(
                    "coded_bytes {} + num_roots {} + pad {} must equal {nn}",
                    config.coded_bytes, config.num_roots, config.pad
                ),
            });
        }

        // Chien search maps locator roots back to symbol positions through
        // the inverse of the root gap; a gap sharing a factor with the
        // group order has none.
        let gap_inverse = (1..nn)
            .find(|x| (x * config.generator_root_gap) % nn == 1)
            .ok_or_else(|| CodecError::Config {
                msg: format!(
                    "generator root gap {} is not invertible modulo {nn}",
                    config.generator_root_gap
                ),
            })?;

        // g(x) = product of (x - alpha^(gap * (fcr + i)))
        let mut genpoly = vec![0u8; config.num_roots + 1];
        genpoly[0] = 1;
        for i in 0..config.num_roots {
            let root = gf.exp((config.first_consecutive_root + i) * config.generator_root_gap);
            for j in (1..=i + 1).rev() {
                genpoly[j] = genpoly[j - 1] ^ gf.mul(genpoly[j], root);
            }
            genpoly[0] = gf.mul(genpoly[0], root);
        }

        Ok(Self {
            config,
            gf,
            genpoly,
            gap_inverse,
        })
    }

    /// Code parameters
    pub fn config(&self) -> &ReedSolomonConfig {
        &self.config
    }

    /// Encode a message, returning message plus `num_roots` parity symbols.
    ///
    /// Messages shorter than `coded_bytes` are treated as if preceded by
    /// zero symbols; leading zeros do not change the division remainder, so
    /// the parity is computed over the message alone.
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>> {
        if message.len() > self.config.coded_bytes {
            return Err(CodecError::MessageTooLong {
                len: message.len(),
                max: self.config.coded_bytes,
            });
        }

        let nr = self.config.num_roots;
        let mut remainder = vec![0u8; nr];
        for &symbol in message {
            let feedback = symbol ^ remainder[nr - 1];
            for j in (1..nr).rev() {
                remainder[j] = remainder[j - 1] ^ self.gf.mul(feedback, self.genpoly[j]);
            }
            remainder[0] = self.gf.mul(feedback, self.genpoly[0]);
        }

        let mut codeword = Vec::with_capacity(message.len() + nr);
        codeword.extend_from_slice(message);
        codeword.extend(remainder.iter().rev());
        Ok(codeword)
    }

    /// Decode a received word in place, correcting up to `num_roots / 2`
    /// symbol errors, and strip nothing: the caller truncates the parity.
    ///
    /// The received length implies the shortening, so any length in
    /// `(num_roots, coded_bytes + num_roots]` is accepted. Fails with
    /// [`CodecError::Uncorrectable`] when the error pattern exceeds the
    /// code's capability.
    pub fn decode(&self, data: &mut [u8]) -> Result<Corrections> {
        let nr = self.config.num_roots;
        if data.len() <= nr {
            return Err(CodecError::MessageTooShort {
                len: data.len(),
                min: nr,
            });
        }
        if data.len() > self.config.coded_bytes + nr {
            return Err(CodecError::MessageTooLong {
                len: data.len(),
                max: self.config.coded_bytes + nr,
            });
        }

        let syndromes = self.syndromes(data);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(Corrections::default());
        }

        let lambda = self.berlekamp_massey(&syndromes);
        let errors = lambda.len() - 1;
        if errors == 0 || 2 * errors > nr {
            return Err(CodecError::Uncorrectable);
        }

        let roots = self.chien_search(&lambda, data.len())?;
        let bits = self.forney(&syndromes, &lambda, &roots, data)?;

        // A mislocated correction leaves nonzero syndromes behind.
        if self.syndromes(data).iter().any(|&s| s != 0) {
            return Err(CodecError::Uncorrectable);
        }

        trace!(symbols = errors, bits, "reed-solomon corrected");
        Ok(Corrections {
            symbols: errors,
            bits,
        })
    }

    /// Erasure-aware decoding is a defined but unimplemented extension.
    pub fn decode_with_erasures(&self, _data: &mut [u8], _erasures: &[usize]) -> Result<Corrections> {
        Err(CodecError::NotImplemented {
            feature: "erasure-aware Reed-Solomon decoding",
        })
    }

    /// Syndromes of the received word at the generator roots.
    fn syndromes(&self, data: &[u8]) -> Vec<u8> {
        let cfg = &self.config;
        (0..cfg.num_roots)
            .map(|i| {
                let root = self
                    .gf
                    .exp((cfg.first_consecutive_root + i) * cfg.generator_root_gap);
                data.iter().fold(0u8, |acc, &b| self.gf.mul(acc, root) ^ b)
            })
            .collect()
    }

    /// Berlekamp-Massey: minimal LFSR generating the syndrome sequence.
    ///
    /// Returns the error locator polynomial trimmed to its degree.
    fn berlekamp_massey(&self, syndromes: &[u8]) -> Vec<u8> {
        let nr = syndromes.len();
        let mut current = vec![0u8; nr + 1];
        current[0] = 1;
        let mut previous = current.clone();

        let mut errors = 0usize;
        let mut shift = 1usize;
        let mut last_discrepancy = 1u8;

        for n in 0..nr {
            let mut discrepancy = syndromes[n];
            for i in 1..=errors {
                discrepancy ^= self.gf.mul(current[i], syndromes[n - i]);
            }

            if discrepancy == 0 {
                shift += 1;
            } else if 2 * errors <= n {
                let saved = current.clone();
                let coeff = self.gf.div(discrepancy, last_discrepancy);
                for i in 0..=nr - shift {
                    current[i + shift] ^= self.gf.mul(coeff, previous[i]);
                }
                errors = n + 1 - errors;
                previous = saved;
                last_discrepancy = discrepancy;
                shift = 1;
            } else {
                let coeff = self.gf.div(discrepancy, last_discrepancy);
                for i in 0..=nr - shift {
                    current[i + shift] ^= self.gf.mul(coeff, previous[i]);
                }
                shift += 1;
            }
        }

        let degree = current.iter().rposition(|&c| c != 0).unwrap_or(0);
        current.truncate(degree + 1);
        current
    }

    /// Chien search: locate the error positions as indices into `data`.
    ///
    /// Also returns each locator root for the Forney evaluation.
    fn chien_search(&self, lambda: &[u8], len: usize) -> Result<Vec<(usize, u8, usize)>> {
        let nn = self.gf.size();
        let expected = lambda.len() - 1;
        let mut roots = Vec::with_capacity(expected);

        for i in 0..nn {
            let x = self.gf.exp(i);
            if self.gf.poly_eval(lambda, x) != 0 {
                continue;
            }
            // The root is Z^-1 = alpha^i with Z = alpha^(gap * power);
            // recover the power position through the gap inverse.
            let power = ((nn - i) % nn * self.gap_inverse) % nn;
            if power >= len {
                // Error located inside the implicit zero padding
                return Err(CodecError::Uncorrectable);
            }
            roots.push((len - 1 - power, x, power));
            if roots.len() > expected {
                break;
            }
        }

        if roots.len() != expected {
            return Err(CodecError::Uncorrectable);
        }
        Ok(roots)
    }

    /// Forney's algorithm: compute and apply the error magnitudes.
    ///
    /// Returns the number of corrected bits.
    fn forney(
        &self,
        syndromes: &[u8],
        lambda: &[u8],
        roots: &[(usize, u8, usize)],
        data: &mut [u8],
    ) -> Result<usize> {
        let cfg = &self.config;
        let nn = self.gf.size();
        let nr = cfg.num_roots;

        // Error evaluator Omega(x) = S(x) * Lambda(x) mod x^nr
        let mut omega = vec![0u8; nr];
        for (i, omega_i) in omega.iter_mut().enumerate() {
            for j in 0..lambda.len().min(i + 1) {
                *omega_i ^= self.gf.mul(lambda[j], syndromes[i - j]);
            }
        }

        let mut bits = 0usize;
        for &(position, x_inv, power) in roots {
            let omega_val = self.gf.poly_eval(&omega, x_inv);

            // Formal derivative of Lambda evaluated at the root: only odd
            // powers survive in characteristic 2.
            let mut lambda_prime = 0u8;
            for j in (1..lambda.len()).step_by(2) {
                lambda_prime ^= self.gf.mul(lambda[j], self.gf.pow(x_inv, j - 1));
            }
            if lambda_prime == 0 {
                return Err(CodecError::Uncorrectable);
            }

            // e = Z * Omega(Z^-1) / Lambda'(Z^-1) scaled back out of the
            // first-root offset.
            let z = self.gf.inv(x_inv);
            let magnitude = self.gf.mul(z, self.gf.div(omega_val, lambda_prime));
            let offset = (cfg.generator_root_gap * cfg.first_consecutive_root % nn) * power % nn;
            let error = self.gf.div(magnitude, self.gf.exp(offset));

            data[position] ^= error;
            bits += error.count_ones() as usize;
        }
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn corrupt(rng: &mut StdRng, codeword: &mut [u8], count: usize) -> usize {
        let mut positions = Vec::new();
        let mut bits = 0;
        while positions.len() < count {
            let pos = rng.gen_range(0..codeword.len());
            if positions.contains(&pos) {
                continue;
            }
            let error = rng.gen_range(1..=255u8);
            codeword[pos] ^= error;
            bits += error.count_ones() as usize;
            positions.push(pos);
        }
        bits
    }

    #[test]
    fn test_encode_appends_parity() {
        let rs = ReedSolomon::new(ReedSolomonConfig::ccsds_255_223()).unwrap();
        let message = vec![0x42u8; 223];
        let codeword = rs.encode(&message).unwrap();
        assert_eq!(codeword.len(), 255);
        assert_eq!(&codeword[..223], message.as_slice());
    }

    #[test]
    fn test_clean_roundtrip_reports_zero_corrections() {
        let rs = ReedSolomon::new(ReedSolomonConfig::ccsds_255_239()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let len = rng.gen_range(1..=239);
            let message: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let mut codeword = rs.encode(&message).unwrap();
            let corrections = rs.decode(&mut codeword).unwrap();
            assert_eq!(corrections, Corrections::default());
            assert_eq!(&codeword[..len], message.as_slice());
        }
    }

    #[test]
    fn test_corrects_up_to_capability() {
        let rs = ReedSolomon::new(ReedSolomonConfig::ccsds_255_223()).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..10 {
            let len = rng.gen_range(40..=223);
            let message: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let codeword = rs.encode(&message).unwrap();

            let symbols = rng.gen_range(1..=16);
            let mut received = codeword.clone();
            let bits = corrupt(&mut rng, &mut received, symbols);

            let corrections = rs.decode(&mut received).unwrap();
            assert_eq!(received, codeword);
            assert_eq!(corrections.symbols, symbols);
            assert_eq!(corrections.bits, bits);
        }
    }

    #[test]
    fn test_too_many_errors_fail() {
        let rs = ReedSolomon::new(ReedSolomonConfig::ccsds_255_239()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let message: Vec<u8> = (0..239).map(|_| rng.gen()).collect();
        let codeword = rs.encode(&message).unwrap();

        for _ in 0..10 {
            let mut received = codeword.clone();
            corrupt(&mut rng, &mut received, 12);
            // 12 > t = 8: either detected, or (by design of the code, very
            // rarely) a different valid codeword; never the original with a
            // wrong count.
            if let Ok(c) = rs.decode(&mut received) {
                assert!(c.symbols <= 8);
                assert_ne!(received, codeword);
            }
        }
    }

    #[test]
    fn test_length_bounds() {
        let rs = ReedSolomon::new(ReedSolomonConfig::ccsds_255_223()).unwrap();
        assert!(matches!(
            rs.encode(&[0u8; 224]),
            Err(CodecError::MessageTooLong { len: 224, max: 223 })
        ));
        let mut short = [0u8; 32];
        assert!(matches!(
            rs.decode(&mut short),
            Err(CodecError::MessageTooShort { .. })
        ));
        let mut long = [0u8; 256];
        assert!(matches!(
            rs.decode(&mut long),
            Err(CodecError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_shortened_code_with_pad() {
        let config = ReedSolomonConfig {
            symbol_size: 6,
            primitive_polynomial: 0x43,
            first_consecutive_root: 1,
            generator_root_gap: 1,
            coded_bytes: 43,
            num_roots: 10,
            pad: 10,
        };
        let rs = ReedSolomon::new(config).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let message: Vec<u8> = (0..30).map(|_| rng.gen_range(0..64)).collect();
        let codeword = rs.encode(&message).unwrap();

        let mut received = codeword.clone();
        for pos in [0usize, 7, 19, 33, 38] {
            received[pos] ^= rng.gen_range(1..64u8);
        }
        let corrections = rs.decode(&mut received).unwrap();
        assert_eq!(corrections.symbols, 5);
        assert_eq!(received, codeword);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ReedSolomonConfig::ccsds_255_223();
        config.coded_bytes = 200;
        assert!(ReedSolomon::new(config).is_err());

        let mut config = ReedSolomonConfig::ccsds_255_223();
        config.generator_root_gap = 0;
        assert!(ReedSolomon::new(config).is_err());

        // gap 85 shares a factor with 255
        let mut config = ReedSolomonConfig::ccsds_255_223();
        config.generator_root_gap = 85;
        assert!(ReedSolomon::new(config).is_err());

        let mut config = ReedSolomonConfig::ccsds_255_223();
        config.pad = 230;
        assert!(ReedSolomon::new(config).is_err());
    }

    #[test]
    fn test_erasure_decoding_unimplemented() {
        let rs = ReedSolomon::new(ReedSolomonConfig::ccsds_255_239()).unwrap();
        let mut data = [0u8; 255];
        assert!(matches!(
            rs.decode_with_erasures(&mut data, &[3]),
            Err(CodecError::NotImplemented { .. })
        ));
    }
}
