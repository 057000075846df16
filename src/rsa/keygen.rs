// RSA Key Generation
// Derives matched exponent pairs over a modulus built from two primes

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use num_traits::{One, Zero};
use rand::rngs::ThreadRng;
use rand::{thread_rng, CryptoRng, RngCore};

use super::bigint::{from_u64, gcd, mod_inverse, parse_hex, random_in_range, RsaBigInt};
use super::ciphertext::Ciphertext;
use super::error::{Result, RsaError};
use super::prime::{is_probable_prime_with_rng, random_prime, DEFAULT_PRIME_BITS, KEYGEN_ROUNDS};

/// Smallest modulus that can carry a one-byte block.
pub const MIN_MODULUS: u64 = 256;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub e: RsaBigInt, // Public exponent
    pub n: RsaBigInt, // Modulus
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub d: RsaBigInt, // Private exponent
    pub n: RsaBigInt, // Modulus (same as public)
}

/// RSA Key Pair: both halves over one modulus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl PublicKey {
    pub fn new(e: RsaBigInt, n: RsaBigInt) -> Self {
        Self { e, n }
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt a message of any length using this public key
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext> {
        super::encrypt::encrypt(plaintext, self)
    }
}

impl PrivateKey {
    pub fn new(d: RsaBigInt, n: RsaBigInt) -> Self {
        Self { d, n }
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Decrypt a ciphertext using this private key
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>> {
        super::decrypt::decrypt(ciphertext, self)
    }
}

impl KeyPair {
    /// Bind a separately stored public and private key.
    ///
    /// Fails with `KeyMismatch` when the two moduli differ.
    pub fn from_parts(public_key: PublicKey, private_key: PrivateKey) -> Result<Self> {
        if public_key.n != private_key.n {
            return Err(RsaError::KeyMismatch {
                public: public_key.n,
                private: private_key.n,
            });
        }
        Ok(Self {
            public_key,
            private_key,
        })
    }

    /// Build the pair for primes `p`, `q` from a chosen private exponent `d`.
    ///
    /// The primes are not re-tested here.
    pub fn from_private_exponent(p: &RsaBigInt, q: &RsaBigInt, d: RsaBigInt) -> Result<Self> {
        let (n, phi) = modulus_and_totient(p, q)?;
        if !gcd(&d, &phi)?.is_one() {
            return Err(RsaError::NotInvertible);
        }
        let e = mod_inverse(&d, &phi)?;

        Ok(Self {
            public_key: PublicKey::new(e, n.clone()),
            private_key: PrivateKey::new(d, n),
        })
    }

    pub fn n(&self) -> &RsaBigInt {
        &self.public_key.n
    }

    pub fn e(&self) -> &RsaBigInt {
        &self.public_key.e
    }

    pub fn d(&self) -> &RsaBigInt {
        &self.private_key.d
    }

    /// Get the bit length of the key
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext> {
        self.public_key.encrypt(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>> {
        self.private_key.decrypt(ciphertext)
    }
}

/// n = p*q and φ(n) = (p-1)(q-1)
fn modulus_and_totient(p: &RsaBigInt, q: &RsaBigInt) -> Result<(RsaBigInt, RsaBigInt)> {
    if p.is_zero() || q.is_zero() {
        return Err(RsaError::InvalidArgument(
            "prime factors must be positive integers".to_string(),
        ));
    }
    Ok((p * q, (p - 1u8) * (q - 1u8)))
}

/// Key generation over a caller-chosen CSPRNG.
///
/// `rounds` is the Miller-Rabin round count used both for searching and for
/// checking supplied primes. `max_attempts` bounds every retry loop.
#[derive(Debug)]
pub struct KeyGenerator<R> {
    rng: R,
    rounds: u32,
    max_attempts: Option<u64>,
}

impl KeyGenerator<ThreadRng> {
    /// Generator backed by the thread-local CSPRNG
    pub fn with_thread_rng() -> Self {
        Self::new(thread_rng())
    }
}

impl<R: RngCore + CryptoRng> KeyGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            rounds: KEYGEN_ROUNDS,
            max_attempts: None,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Generate a key pair from two caller-supplied primes.
    pub fn from_primes(
        &mut self,
        p: &RsaBigInt,
        q: &RsaBigInt,
        allow_small_modulus: bool,
    ) -> Result<KeyPair> {
        if p.is_zero() || q.is_zero() {
            return Err(RsaError::InvalidArgument(
                "prime factors must be positive integers".to_string(),
            ));
        }
        if p == q {
            return Err(RsaError::InvalidArgument(
                "prime factors must be distinct".to_string(),
            ));
        }
        for factor in [p, q] {
            if !is_probable_prime_with_rng(factor, self.rounds, &mut self.rng)? {
                return Err(RsaError::NotPrime(factor.clone()));
            }
        }

        let n = p * q;
        if n < from_u64(MIN_MODULUS) && !allow_small_modulus {
            return Err(RsaError::ModulusTooSmall { modulus: n });
        }

        self.derive(p, q)
    }

    /// Generate a key pair from two random primes of `bits` bits each.
    pub fn from_bit_length(&mut self, bits: u64) -> Result<KeyPair> {
        let p = random_prime(&mut self.rng, bits, self.rounds, self.max_attempts)?;
        let mut q = random_prime(&mut self.rng, bits, self.rounds, self.max_attempts)?;
        while q == p {
            debug!("second prime equals the first, resampling");
            q = random_prime(&mut self.rng, bits, self.rounds, self.max_attempts)?;
        }

        self.derive(&p, &q)
    }

    /// Draw d uniformly from [2, φ-2] until it is coprime to φ, then e = d^-1 mod φ.
    fn derive(&mut self, p: &RsaBigInt, q: &RsaBigInt) -> Result<KeyPair> {
        let (_, phi) = modulus_and_totient(p, q)?;
        if phi < from_u64(8) {
            return Err(RsaError::InvalidArgument(format!(
                "totient {} is too small to derive an exponent pair",
                phi
            )));
        }

        let low = from_u64(2);
        let high = &phi - 2u8;
        let mut attempts = 0u64;
        let d = loop {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(RsaError::SearchExhausted { attempts });
            }
            attempts += 1;

            let candidate = random_in_range(&mut self.rng, &low, &high);
            if gcd(&candidate, &phi)?.is_one() {
                break candidate;
            }
        };
        debug!("private exponent found after {} candidates", attempts);

        let keypair = KeyPair::from_private_exponent(p, q, d)?;
        info!("generated {}-bit RSA key pair", keypair.bit_length());
        Ok(keypair)
    }
}

/// Generate a key pair from two primes using the thread-local CSPRNG.
///
/// Rejects a modulus below 256 unless `allow_small_modulus` is set.
pub fn generate_from_primes(
    p: &RsaBigInt,
    q: &RsaBigInt,
    allow_small_modulus: bool,
) -> Result<KeyPair> {
    KeyGenerator::with_thread_rng().from_primes(p, q, allow_small_modulus)
}

/// Generate a key pair whose primes are each `bits` bits long.
pub fn generate_from_bit_length(bits: u64) -> Result<KeyPair> {
    KeyGenerator::with_thread_rng().from_bit_length(bits)
}

/// Generate a key pair with the standard preset of two 420-bit primes.
pub fn generate_420_keys() -> Result<KeyPair> {
    generate_from_bit_length(DEFAULT_PRIME_BITS)
}

// Key text format: "<exponent> <modulus>", both lower-case hex

fn parse_key_text(s: &str) -> Result<(RsaBigInt, RsaBigInt)> {
    let fields: Vec<&str> = s.split_whitespace().collect();
    let [exponent, modulus] = fields.as_slice() else {
        return Err(RsaError::MalformedKey(format!(
            "expected two fields, found {}",
            fields.len()
        )));
    };

    let parse = |field: &str| {
        parse_hex(field)
            .ok_or_else(|| RsaError::MalformedKey(format!("'{}' is not a hex integer", field)))
    };
    let (exponent, modulus) = (parse(*exponent)?, parse(*modulus)?);
    if modulus.is_zero() {
        return Err(RsaError::MalformedKey("modulus is zero".to_string()));
    }

    Ok((exponent, modulus))
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} {:x}", self.e, self.n)
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} {:x}", self.d, self.n)
    }
}

impl FromStr for PublicKey {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self> {
        let (e, n) = parse_key_text(s)?;
        Ok(Self::new(e, n))
    }
}

impl FromStr for PrivateKey {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self> {
        let (d, n) = parse_key_text(s)?;
        Ok(Self::new(d, n))
    }
}
