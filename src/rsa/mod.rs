// RSA Module - Main module file
// Exports all RSA-related functionality

pub mod bigint;
pub mod ciphertext;
pub mod codec;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod keygen;
pub mod prime;

pub use bigint::{gcd, mod_inverse, RsaBigInt};
pub use ciphertext::Ciphertext;
pub use codec::{block_length, decode, encode, Block};
pub use decrypt::decrypt;
pub use encrypt::{encrypt, transform};
pub use error::{Result, RsaError};
pub use keygen::{
    generate_420_keys, generate_from_bit_length, generate_from_primes, KeyGenerator, KeyPair,
    PrivateKey, PublicKey,
};
pub use prime::{is_probable_prime, is_probable_prime_with_rng, DEFAULT_PRIME_BITS};
