// File Operations for RSA Encryption/Decryption
// Handles reading and writing key files, plaintext and ciphertext

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::Config;
use crate::rsa::{Ciphertext, KeyPair, PrivateKey, PublicKey, RsaError};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not valid UTF-8 text")]
    NotText { path: PathBuf },

    #[error(transparent)]
    Crypto(#[from] RsaError),
}

/// Result type for file operations
pub type FileResult<T> = Result<T, FileError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> FileError + '_ {
    move |source| FileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read entire file into memory
pub fn read_file(path: &Path) -> FileResult<Vec<u8>> {
    let mut file = File::open(path).map_err(io_error(path))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).map_err(io_error(path))?;
    Ok(data)
}

/// Read a file that must be UTF-8 text
pub fn read_text(path: &Path) -> FileResult<String> {
    String::from_utf8(read_file(path)?).map_err(|_| FileError::NotText {
        path: path.to_path_buf(),
    })
}

/// Write data to file
pub fn write_file(path: &Path, data: &[u8]) -> FileResult<()> {
    let mut file = File::create(path).map_err(io_error(path))?;
    file.write_all(data).map_err(io_error(path))?;
    Ok(())
}

/// Read a public key stored as "<e> <n>"
pub fn read_public_key(path: &Path) -> FileResult<PublicKey> {
    Ok(read_text(path)?.parse()?)
}

/// Read a private key stored as "<d> <n>"
pub fn read_private_key(path: &Path) -> FileResult<PrivateKey> {
    Ok(read_text(path)?.parse()?)
}

/// Persist both halves of a key pair at the configured paths
pub fn write_key_pair(keypair: &KeyPair, config: &Config) -> FileResult<()> {
    write_file(
        &config.private_key_path,
        keypair.private_key.to_string().as_bytes(),
    )?;
    write_file(
        &config.public_key_path,
        keypair.public_key.to_string().as_bytes(),
    )?;
    debug!(
        "wrote keys to {} and {}",
        config.public_key_path.display(),
        config.private_key_path.display()
    );
    Ok(())
}

/// Load both key files and check that they share a modulus
pub fn load_key_pair(config: &Config) -> FileResult<KeyPair> {
    let public_key = read_public_key(&config.public_key_path)?;
    let private_key = read_private_key(&config.private_key_path)?;
    Ok(KeyPair::from_parts(public_key, private_key)?)
}

/// Read a ciphertext in its wire format
pub fn read_ciphertext(path: &Path) -> FileResult<Ciphertext> {
    Ok(read_text(path)?.parse()?)
}

/// Write a ciphertext in its wire format
pub fn write_ciphertext(path: &Path, ciphertext: &Ciphertext) -> FileResult<()> {
    write_file(path, ciphertext.to_string().as_bytes())
}
