// RSA Decryption Implementation
// Inverts the block transform under the private exponent and reassembles bytes

use log::info;

use super::ciphertext::Ciphertext;
use super::codec::{block_length, decode, Block};
use super::encrypt::transform;
use super::error::{Result, RsaError};
use super::keygen::PrivateKey;

/// Decrypt ciphertext using the private key
/// Returns the original bytes, leading and trailing zeros included
pub fn decrypt(ciphertext: &Ciphertext, private_key: &PrivateKey) -> Result<Vec<u8>> {
    let expected = block_length(&private_key.n);
    if ciphertext.block_len != expected {
        return Err(RsaError::MalformedCiphertext(format!(
            "block length {} does not match the key's block length {}",
            ciphertext.block_len, expected
        )));
    }

    let last = ciphertext.blocks.len().saturating_sub(1);
    let blocks = ciphertext
        .blocks
        .iter()
        .enumerate()
        .map(|(i, c)| -> Result<Block> {
            let value = transform(c, &private_key.d, &private_key.n)?;
            let len = if i == last {
                ciphertext.last_len
            } else {
                ciphertext.block_len
            };
            Ok(Block { value, len })
        })
        .collect::<Result<Vec<_>>>()?;

    let plaintext = decode(&blocks, &private_key.n)?;
    info!(
        "decrypted {} blocks into {} bytes",
        blocks.len(),
        plaintext.len()
    );
    Ok(plaintext)
}
