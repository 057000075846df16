// RSA Ciphertext
// Transformed blocks plus the two lengths needed to rebuild the plaintext

use std::fmt;
use std::str::FromStr;

use super::bigint::{parse_hex, RsaBigInt};
use super::error::{Result, RsaError};

/// Encrypted message.
///
/// Wire format: space-separated lower-case hex blocks, then the decimal block
/// length and the decimal byte length of the last plaintext block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub blocks: Vec<RsaBigInt>,
    pub block_len: usize,
    pub last_len: usize,
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            write!(f, "{:x} ", block)?;
        }
        write!(f, "{} {}", self.block_len, self.last_len)
    }
}

fn not_decimal(what: &str, field: &str) -> RsaError {
    RsaError::MalformedCiphertext(format!("{} '{}' is not a decimal integer", what, field))
}

impl FromStr for Ciphertext {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields: Vec<&str> = s.split_whitespace().collect();

        let mut pop_len = |what: &str| -> Result<usize> {
            let field = fields
                .pop()
                .ok_or_else(|| RsaError::MalformedCiphertext(format!("missing {}", what)))?;
            if !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(not_decimal(what, field));
            }
            field.parse().map_err(|_| not_decimal(what, field))
        };
        let last_len = pop_len("last block length")?;
        let block_len = pop_len("block length")?;

        if fields.is_empty() {
            return Err(RsaError::MalformedCiphertext("no blocks".to_string()));
        }
        if last_len > block_len {
            return Err(RsaError::MalformedCiphertext(format!(
                "last block length {} exceeds block length {}",
                last_len, block_len
            )));
        }

        let blocks = fields
            .iter()
            .map(|field| {
                parse_hex(field).ok_or_else(|| {
                    RsaError::MalformedCiphertext(format!("block '{}' is not hex", field))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blocks,
            block_len,
            last_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;

    #[test]
    fn test_wire_format() {
        let ciphertext = Ciphertext {
            blocks: vec![from_u64(2140), from_u64(0), from_u64(255)],
            block_len: 1,
            last_len: 1,
        };
        let text = ciphertext.to_string();
        assert_eq!(text, "85c 0 ff 1 1");
        assert_eq!(text.parse::<Ciphertext>().unwrap(), ciphertext);
    }

    #[test]
    fn test_parse_tolerates_trailing_newline() {
        let ciphertext: Ciphertext = "0 4 0\n".parse().unwrap();
        assert_eq!(ciphertext.blocks, vec![from_u64(0)]);
        assert_eq!(ciphertext.block_len, 4);
        assert_eq!(ciphertext.last_len, 0);
    }

    #[test]
    fn test_parse_malformed() {
        let cases = [
            "", "1 1", "abc 1 x", "abc y 1", "xyz 1 1", "abc 1 2", "a_bc 1 1", "+abc 1 1",
            "abc +1 1",
        ];
        for text in cases {
            let result = text.parse::<Ciphertext>();
            assert!(
                matches!(result, Err(RsaError::MalformedCiphertext(_))),
                "accepted {:?}",
                text
            );
        }
    }
}
