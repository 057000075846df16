// RSA Errors
// Error kinds reported by key generation, the block codec and the transform

use super::bigint::RsaBigInt;

/// Errors that can occur during RSA operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RsaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("modular inverse does not exist")]
    NotInvertible,

    #[error("{0} is not prime")]
    NotPrime(RsaBigInt),

    #[error("modulus {modulus} is too small to hold a single byte block")]
    ModulusTooSmall { modulus: RsaBigInt },

    #[error("public key modulus {public:x} does not match private key modulus {private:x}")]
    KeyMismatch {
        public: RsaBigInt,
        private: RsaBigInt,
    },

    #[error("block value does not fit under the modulus")]
    InvalidBlock,

    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("search gave up after {attempts} attempts")]
    SearchExhausted { attempts: u64 },
}

pub type Result<T> = std::result::Result<T, RsaError>;
