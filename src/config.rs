// Configuration
// Key file locations and key generation settings

use std::path::PathBuf;

use rand::{CryptoRng, RngCore};

use crate::rsa::prime::KEYGEN_ROUNDS;
use crate::rsa::KeyGenerator;

pub const DEFAULT_PUBLIC_KEY_PATH: &str = "publicKey.rsa";
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "privateKey.rsa";

/// Configuration for key generation and encryption/decryption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub public_key_path: PathBuf,
    pub private_key_path: PathBuf,
    /// Miller-Rabin rounds for searching and for checking supplied primes
    pub rounds: u32,
    pub allow_small_modulus: bool,
    /// Bound on each retry loop of key generation; `None` searches forever
    pub max_attempts: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_key_path: PathBuf::from(DEFAULT_PUBLIC_KEY_PATH),
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
            rounds: KEYGEN_ROUNDS,
            allow_small_modulus: false,
            max_attempts: None,
        }
    }
}

impl Config {
    pub fn with_public_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_key_path = path.into();
        self
    }

    pub fn with_private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = path.into();
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_allow_small_modulus(mut self, allow: bool) -> Self {
        self.allow_small_modulus = allow;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// A key generator carrying this configuration's search settings
    pub fn key_generator<R: RngCore + CryptoRng>(&self, rng: R) -> KeyGenerator<R> {
        KeyGenerator::new(rng)
            .with_rounds(self.rounds)
            .with_max_attempts(self.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.public_key_path, PathBuf::from("publicKey.rsa"));
        assert_eq!(config.private_key_path, PathBuf::from("privateKey.rsa"));
        assert_eq!(config.rounds, 80);
        assert!(!config.allow_small_modulus);
        assert_eq!(config.max_attempts, None);
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_public_key_path("keys/pub.rsa")
            .with_private_key_path("keys/priv.rsa")
            .with_rounds(40)
            .with_allow_small_modulus(true)
            .with_max_attempts(Some(1000));
        assert_eq!(config.public_key_path, PathBuf::from("keys/pub.rsa"));
        assert_eq!(config.private_key_path, PathBuf::from("keys/priv.rsa"));
        assert_eq!(config.rounds, 40);
        assert!(config.allow_small_modulus);
        assert_eq!(config.max_attempts, Some(1000));
    }
}
