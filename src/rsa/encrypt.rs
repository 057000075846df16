// RSA Encryption Implementation
// Block-wise modular exponentiation under the public exponent

use log::info;

use super::bigint::{mod_pow, RsaBigInt};
use super::ciphertext::Ciphertext;
use super::codec::{block_length, encode};
use super::error::{Result, RsaError};
use super::keygen::PublicKey;

/// block^exponent mod modulus
///
/// Encryption and decryption are both this operation, under e and d
/// respectively. The block must lie in [0, modulus).
pub fn transform(
    block: &RsaBigInt,
    exponent: &RsaBigInt,
    modulus: &RsaBigInt,
) -> Result<RsaBigInt> {
    if block >= modulus {
        return Err(RsaError::InvalidBlock);
    }
    Ok(mod_pow(block, exponent, modulus))
}

/// Encrypt a message of any length using the public key
pub fn encrypt(plaintext: &[u8], public_key: &PublicKey) -> Result<Ciphertext> {
    let blocks = encode(plaintext, &public_key.n)?;
    let last_len = blocks.last().map_or(0, |block| block.len);

    let blocks = blocks
        .iter()
        .map(|block| transform(&block.value, &public_key.e, &public_key.n))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "encrypted {} bytes into {} blocks",
        plaintext.len(),
        blocks.len()
    );
    Ok(Ciphertext {
        blocks,
        block_len: block_length(&public_key.n),
        last_len,
    })
}
