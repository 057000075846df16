// Block Codec
// Splits byte messages into big-endian integer blocks below the modulus

use log::trace;

use super::bigint::{from_bytes, to_fixed_bytes, RsaBigInt};
use super::error::{Result, RsaError};

/// One message chunk as an integer, with the byte length it was read from.
///
/// The length is kept because leading zero bytes vanish in the integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub value: RsaBigInt,
    pub len: usize,
}

/// Bytes per block for `modulus`.
///
/// A block of L bytes is below 2^(8L); with 8L <= bits(n) - 1 that is at most
/// 2^(bits(n)-1) <= n, so every block fits. Zero for moduli below 256.
pub fn block_length(modulus: &RsaBigInt) -> usize {
    (modulus.bits().saturating_sub(1) / 8) as usize
}

/// Split `message` into blocks of `block_length(modulus)` bytes.
///
/// The final block may be shorter. An empty message becomes a single
/// zero-length block so the wire format always has a last block.
pub fn encode(message: &[u8], modulus: &RsaBigInt) -> Result<Vec<Block>> {
    let block_len = block_length(modulus);
    if block_len == 0 {
        return Err(RsaError::ModulusTooSmall {
            modulus: modulus.clone(),
        });
    }

    if message.is_empty() {
        return Ok(vec![Block {
            value: RsaBigInt::default(),
            len: 0,
        }]);
    }

    let blocks: Vec<Block> = message
        .chunks(block_len)
        .map(|chunk| Block {
            value: from_bytes(chunk),
            len: chunk.len(),
        })
        .collect();
    trace!(
        "encoded {} bytes into {} blocks of {}",
        message.len(),
        blocks.len(),
        block_len
    );

    Ok(blocks)
}

/// Reassemble the message from its blocks.
///
/// Every block but the last must be exactly `block_length(modulus)` bytes;
/// the last may be shorter. Each value is re-rendered at its recorded width.
pub fn decode(blocks: &[Block], modulus: &RsaBigInt) -> Result<Vec<u8>> {
    let block_len = block_length(modulus);
    let Some((last, full)) = blocks.split_last() else {
        return Ok(Vec::new());
    };

    if full.iter().any(|block| block.len != block_len) || last.len > block_len {
        return Err(RsaError::InvalidBlock);
    }

    let mut message = Vec::with_capacity(full.len() * block_len + last.len);
    for block in blocks {
        if &block.value >= modulus {
            return Err(RsaError::InvalidBlock);
        }
        let bytes = to_fixed_bytes(&block.value, block.len).ok_or(RsaError::InvalidBlock)?;
        message.extend_from_slice(&bytes);
    }

    Ok(message)
}
