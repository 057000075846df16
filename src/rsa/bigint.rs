// RSA Big Integer Operations
// Wrapper around num-bigint: modular exponentiation, gcd and modular inverse

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};
use std::mem;

use super::error::{Result, RsaError};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Render `n` as exactly `width` big-endian bytes, left-padding with zeros.
///
/// Returns `None` when `n` needs more than `width` bytes.
pub fn to_fixed_bytes(n: &RsaBigInt, width: usize) -> Option<Vec<u8>> {
    if n.is_zero() {
        return Some(vec![0u8; width]);
    }

    let bytes = n.to_bytes_be();
    if bytes.len() > width {
        return None;
    }

    let mut result = vec![0u8; width];
    result[width - bytes.len()..].copy_from_slice(&bytes);
    Some(result)
}

/// Modular exponentiation: base^exp mod modulus. `modulus` must be non-zero.
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    base.modpow(exp, modulus)
}

/// Parse a hex integer, accepting only ASCII hex digits.
///
/// `BigUint::parse_bytes` also takes `_` separators and a leading `+`; the
/// key and ciphertext text formats do not.
pub fn parse_hex(field: &str) -> Option<RsaBigInt> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    RsaBigInt::parse_bytes(field.as_bytes(), 16)
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd = gcd(a, b)
pub fn extended_gcd(a: &RsaBigInt, b: &RsaBigInt) -> (RsaBigInt, BigInt, BigInt) {
    let mut old_r = BigInt::from(a.clone());
    let mut r = BigInt::from(b.clone());
    let (mut old_x, mut x) = (BigInt::one(), BigInt::zero());
    let (mut old_y, mut y) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = mem::replace(&mut r, next_r);

        let next_x = &old_x - &q * &x;
        old_x = mem::replace(&mut x, next_x);

        let next_y = &old_y - &q * &y;
        old_y = mem::replace(&mut y, next_y);
    }

    (old_r.magnitude().clone(), old_x, old_y)
}

/// Compute modular inverse: b^(-1) mod m, normalized into [0, m)
pub fn mod_inverse(b: &RsaBigInt, m: &RsaBigInt) -> Result<RsaBigInt> {
    if m.is_zero() {
        return Err(RsaError::InvalidArgument(
            "modulus of an inverse must be positive".to_string(),
        ));
    }

    let (g, x, _) = extended_gcd(b, m);
    if !g.is_one() {
        return Err(RsaError::NotInvertible);
    }

    // The Bézout coefficient may be negative
    let m = BigInt::from(m.clone());
    Ok(x.mod_floor(&m).magnitude().clone())
}

/// Greatest common divisor of two positive integers
pub fn gcd(x: &RsaBigInt, y: &RsaBigInt) -> Result<RsaBigInt> {
    if x.is_zero() || y.is_zero() {
        return Err(RsaError::InvalidArgument(
            "gcd requires two positive integers".to_string(),
        ));
    }

    let (mut x, mut y) = if x < y {
        (y.clone(), x.clone())
    } else {
        (x.clone(), y.clone())
    };

    while !y.is_zero() {
        let r = &x % &y;
        x = mem::replace(&mut y, r);
    }

    Ok(x)
}

/// Draw a uniformly random integer in `[low, high]` (both inclusive)
pub fn random_in_range<R>(rng: &mut R, low: &RsaBigInt, high: &RsaBigInt) -> RsaBigInt
where
    R: Rng + CryptoRng + ?Sized,
{
    rng.gen_biguint_range(low, &(high + 1u8))
}
