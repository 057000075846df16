//! Textbook RSA built from first principles.
//!
//! Miller-Rabin prime search, an extended-Euclid modular inverse, key
//! generation that draws the private exponent first, and a block codec that
//! carries messages of any length (leading zero bytes included) through
//! block-wise modular exponentiation.
//!
//! No padding scheme and no constant-time arithmetic: not for production use.
//!
//! ```rust,no_run
//! use rsa420::rsa::generate_from_bit_length;
//!
//! let keypair = generate_from_bit_length(512).expect("key generation failed");
//! let ciphertext = keypair.encrypt(b"hello world").expect("encryption failed");
//! let plaintext = keypair.decrypt(&ciphertext).expect("decryption failed");
//! assert_eq!(plaintext, b"hello world");
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod rsa;
pub mod util;

pub use config::Config;
pub use rsa::{Ciphertext, KeyPair, PrivateKey, PublicKey, RsaError};
