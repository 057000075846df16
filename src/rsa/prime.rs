// Primality Testing
// Miller-Rabin probable-prime test and random prime search

use log::{debug, trace};
use num_bigint::RandBigInt;
use num_integer::Integer;
use num_traits::One;
use rand::{thread_rng, CryptoRng, Rng};

use super::bigint::{mod_pow, random_in_range, RsaBigInt};
use super::error::{Result, RsaError};

/// Default Miller-Rabin rounds when checking a caller-supplied integer.
pub const DEFAULT_ROUNDS: u32 = 40;

/// Rounds used when searching for primes that end up in a persisted key.
pub const KEYGEN_ROUNDS: u32 = 80;

/// Prime size of the standard key preset; the modulus comes out at 839 or 840 bits.
pub const DEFAULT_PRIME_BITS: u64 = 420;

/// Smallest bit length accepted by the prime search.
///
/// Five bits is the least size at which two distinct primes with the top bit
/// set always multiply to a modulus of at least 256.
pub const MIN_PRIME_BITS: u64 = 5;

/// Miller-Rabin primality test
/// Returns true if n is probably prime, drawing witnesses from the thread-local CSPRNG.
pub fn is_probable_prime(n: &RsaBigInt, rounds: u32) -> Result<bool> {
    is_probable_prime_with_rng(n, rounds, &mut thread_rng())
}

/// Miller-Rabin primality test with an explicit random source.
///
/// A composite slips through with probability at most `4^-rounds`.
pub fn is_probable_prime_with_rng<R>(n: &RsaBigInt, rounds: u32, rng: &mut R) -> Result<bool>
where
    R: Rng + CryptoRng + ?Sized,
{
    if rounds == 0 {
        return Err(RsaError::InvalidArgument(
            "Miller-Rabin needs at least one round".to_string(),
        ));
    }

    let two = RsaBigInt::from(2u8);
    if n < &two {
        return Ok(false);
    }
    if n == &two || n == &RsaBigInt::from(3u8) {
        return Ok(true);
    }
    if n.is_even() {
        return Ok(false);
    }

    // Write n-1 as 2^r * s with s odd
    let n_minus_one = n - 1u8;
    let mut s = n_minus_one.clone();
    let mut r = 0u32;
    while s.is_even() {
        s >>= 1;
        r += 1;
    }

    let n_minus_two = n - 2u8;

    'witness: for _ in 0..rounds {
        // Pick random witness a in [2, n-2]
        let a = random_in_range(rng, &two, &n_minus_two);

        let mut x = mod_pow(&a, &s, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..r {
            x = mod_pow(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return Ok(false);
    }

    // Probably prime
    Ok(true)
}

/// Search for a random prime of exactly `bits` bits.
///
/// Each candidate has its top and bottom bits forced, so it is odd and of
/// full length. `max_attempts` bounds the number of candidates tested.
pub fn random_prime<R>(
    rng: &mut R,
    bits: u64,
    rounds: u32,
    max_attempts: Option<u64>,
) -> Result<RsaBigInt>
where
    R: Rng + CryptoRng + ?Sized,
{
    if bits < MIN_PRIME_BITS {
        return Err(RsaError::InvalidArgument(format!(
            "primes must be at least {} bits, got {}",
            MIN_PRIME_BITS, bits
        )));
    }

    let mut attempts = 0u64;
    loop {
        if max_attempts.is_some_and(|max| attempts >= max) {
            return Err(RsaError::SearchExhausted { attempts });
        }
        attempts += 1;

        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        trace!("testing {}-bit prime candidate #{}", bits, attempts);

        if is_probable_prime_with_rng(&candidate, rounds, rng)? {
            debug!("found {}-bit prime after {} candidates", bits, attempts);
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sieve(limit: usize) -> Vec<bool> {
        let mut is_prime = vec![true; limit];
        is_prime[0] = false;
        is_prime[1] = false;
        let mut i = 2;
        while i * i < limit {
            if is_prime[i] {
                let mut j = i * i;
                while j < limit {
                    is_prime[j] = false;
                    j += i;
                }
            }
            i += 1;
        }
        is_prime
    }

    #[test]
    fn test_is_probable_prime() {
        assert!(is_probable_prime(&from_u64(2), 5).unwrap());
        assert!(is_probable_prime(&from_u64(3), 5).unwrap());
        assert!(is_probable_prime(&from_u64(7), 5).unwrap());
        assert!(!is_probable_prime(&from_u64(4), 5).unwrap());
        assert!(!is_probable_prime(&from_u64(9), 5).unwrap());
    }

    #[test]
    fn test_small_values_rejected() {
        assert!(!is_probable_prime(&from_u64(0), 5).unwrap());
        assert!(!is_probable_prime(&from_u64(1), 5).unwrap());
    }

    #[test]
    fn test_zero_rounds_is_caller_error() {
        assert!(matches!(
            is_probable_prime(&from_u64(7), 0),
            Err(RsaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_exhaustive_below_ten_thousand() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let table = sieve(10_000);
        for (n, &expected) in table.iter().enumerate() {
            let got = is_probable_prime_with_rng(&from_u64(n as u64), DEFAULT_ROUNDS, &mut rng)
                .unwrap();
            assert_eq!(got, expected, "wrong verdict for {}", n);
        }
    }

    #[test]
    fn test_carmichael_numbers() {
        let mut rng = StdRng::seed_from_u64(561);
        for n in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 41041, 825265] {
            assert!(!is_probable_prime_with_rng(&from_u64(n), DEFAULT_ROUNDS, &mut rng).unwrap());
        }
    }

    #[test]
    fn test_large_known_prime() {
        // 2^127 - 1
        let m127 = (RsaBigInt::one() << 127usize) - 1u8;
        assert!(is_probable_prime(&m127, DEFAULT_ROUNDS).unwrap());
        assert!(!is_probable_prime(&(&m127 * 3u8), DEFAULT_ROUNDS).unwrap());
    }

    #[test]
    fn test_random_prime_bit_length() {
        let mut rng = StdRng::seed_from_u64(42);
        for bits in [5u64, 16, 64, 128] {
            let p = random_prime(&mut rng, bits, DEFAULT_ROUNDS, None).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(p.is_odd());
            assert!(is_probable_prime_with_rng(&p, DEFAULT_ROUNDS, &mut rng).unwrap());
        }
    }

    #[test]
    fn test_random_prime_too_few_bits() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            random_prime(&mut rng, 4, DEFAULT_ROUNDS, None),
            Err(RsaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_random_prime_bounded_search() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            random_prime(&mut rng, 256, DEFAULT_ROUNDS, Some(0)),
            Err(RsaError::SearchExhausted { attempts: 0 })
        );
    }
}
