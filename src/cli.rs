// Command Line Interface
// Wires the file collaborators to key generation, encryption and decryption

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::thread_rng;

use crate::config::{Config, DEFAULT_PRIVATE_KEY_PATH, DEFAULT_PUBLIC_KEY_PATH};
use crate::logging;
use crate::rsa::prime::{DEFAULT_PRIME_BITS, KEYGEN_ROUNDS};
use crate::rsa::RsaBigInt;
use crate::util::file_ops::{
    load_key_pair, read_ciphertext, read_file, write_ciphertext, write_file, write_key_pair,
};

/// Textbook RSA over arbitrary files.
#[derive(Parser, Debug)]
#[command(name = "rsa420", version, about)]
pub struct Cli {
    /// Public key file ("<e> <n>" in hex)
    #[arg(long, global = true, default_value = DEFAULT_PUBLIC_KEY_PATH)]
    public_key: PathBuf,

    /// Private key file ("<d> <n>" in hex)
    #[arg(long, global = true, default_value = DEFAULT_PRIVATE_KEY_PATH)]
    private_key: PathBuf,

    /// Miller-Rabin rounds used during key generation
    #[arg(long, global = true, default_value_t = KEYGEN_ROUNDS)]
    rounds: u32,

    /// Give up key generation after this many candidates per search
    #[arg(long, global = true)]
    max_attempts: Option<u64>,

    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair and write both key files
    Keygen(KeygenArgs),
    /// Encrypt a file with the public key
    Encrypt {
        input: PathBuf,
        output: PathBuf,
    },
    /// Decrypt a file with the private key
    Decrypt {
        input: PathBuf,
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct KeygenArgs {
    /// Bit length of each random prime [default: 420]
    #[arg(long, conflicts_with_all = ["p", "q"])]
    bits: Option<u64>,

    /// First prime (decimal)
    #[arg(short, requires = "q")]
    p: Option<RsaBigInt>,

    /// Second prime (decimal)
    #[arg(short, requires = "p")]
    q: Option<RsaBigInt>,

    /// Accept a modulus below 256 when primes are given explicitly
    #[arg(long)]
    allow_small_modulus: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_public_key_path(&self.public_key)
            .with_private_key_path(&self.private_key)
            .with_rounds(self.rounds)
            .with_max_attempts(self.max_attempts)
    }
}

/// Parse the process arguments and run the selected command
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet));
    execute(cli)
}

/// Run an already parsed command line
pub fn execute(cli: Cli) -> Result<()> {
    let config = cli.config();

    match cli.command {
        Command::Keygen(args) => {
            let config = config.with_allow_small_modulus(args.allow_small_modulus);
            let mut generator = config.key_generator(thread_rng());
            let keypair = match (args.p, args.q) {
                (Some(p), Some(q)) => generator
                    .from_primes(&p, &q, config.allow_small_modulus)
                    .context("failed to derive keys from the given primes")?,
                (None, None) => {
                    let bits = args.bits.unwrap_or(DEFAULT_PRIME_BITS);
                    generator
                        .from_bit_length(bits)
                        .with_context(|| format!("failed to generate {}-bit primes", bits))?
                }
                _ => anyhow::bail!("-p and -q must be given together"),
            };

            write_key_pair(&keypair, &config).context("failed to write key files")?;
            println!(
                "Generated {}-bit key pair: {} (public), {} (private)",
                keypair.bit_length(),
                config.public_key_path.display(),
                config.private_key_path.display()
            );
        }
        Command::Encrypt { input, output } => {
            let keypair = load_key_pair(&config).context("failed to load keys")?;
            let plaintext = read_file(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let ciphertext = keypair.encrypt(&plaintext).context("encryption failed")?;
            write_ciphertext(&output, &ciphertext)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("{} -> {}", input.display(), output.display());
        }
        Command::Decrypt { input, output } => {
            let keypair = load_key_pair(&config).context("failed to load keys")?;
            let ciphertext = read_ciphertext(&input)
                .with_context(|| format!("failed to read ciphertext {}", input.display()))?;
            let plaintext = keypair.decrypt(&ciphertext).context("decryption failed")?;
            write_file(&output, &plaintext)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("{} -> {}", input.display(), output.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::RsaError;
    use crate::util::file_ops::FileError;
    use clap::CommandFactory;
    use tempfile::TempDir;

    fn parse(dir: &TempDir, args: &[&str]) -> Cli {
        let public = dir.path().join("publicKey.rsa");
        let private = dir.path().join("privateKey.rsa");
        let mut argv = vec![
            "rsa420".to_string(),
            "--public-key".to_string(),
            public.display().to_string(),
            "--private-key".to_string(),
            private.display().to_string(),
            "--rounds".to_string(),
            "40".to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    fn path_arg(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).display().to_string()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_keygen_argument_combinations() {
        let cli = Cli::try_parse_from(["rsa420", "keygen"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Keygen(KeygenArgs {
                bits: None,
                p: None,
                q: None,
                ..
            })
        ));

        assert!(Cli::try_parse_from(["rsa420", "keygen", "-p", "61"]).is_err());
        let both = ["rsa420", "keygen", "--bits", "64", "-p", "61", "-q", "53"];
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn test_keygen_default_preset() {
        let dir = TempDir::new().unwrap();
        let mut cli = parse(&dir, &["keygen"]);
        cli.rounds = 8;
        execute(cli).unwrap();

        let config = Config::default()
            .with_public_key_path(dir.path().join("publicKey.rsa"))
            .with_private_key_path(dir.path().join("privateKey.rsa"));
        let keypair = load_key_pair(&config).unwrap();
        assert!(keypair.bit_length() >= 2 * DEFAULT_PRIME_BITS - 1);
        assert!(keypair.bit_length() <= 2 * DEFAULT_PRIME_BITS);
    }

    #[test]
    fn test_encrypt_decrypt_file() {
        let dir = TempDir::new().unwrap();
        let input = path_arg(&dir, "message.bin");
        let encrypted = path_arg(&dir, "encrypted.xx");
        let decrypted = path_arg(&dir, "decrypted.xx");
        let message = b"\0\0binary file contents\n\0".to_vec();
        write_file(input.as_ref(), &message).unwrap();

        execute(parse(&dir, &["keygen", "--bits", "64"])).unwrap();
        execute(parse(&dir, &["encrypt", &input, &encrypted])).unwrap();
        execute(parse(&dir, &["decrypt", &encrypted, &decrypted])).unwrap();

        assert_eq!(read_file(decrypted.as_ref()).unwrap(), message);
    }

    #[test]
    fn test_keygen_from_primes() {
        let dir = TempDir::new().unwrap();
        execute(parse(&dir, &["keygen", "-p", "61", "-q", "53"])).unwrap();

        let config = Config::default()
            .with_public_key_path(dir.path().join("publicKey.rsa"))
            .with_private_key_path(dir.path().join("privateKey.rsa"));
        let keypair = load_key_pair(&config).unwrap();
        assert_eq!(keypair.n(), &RsaBigInt::from(3233u32));
    }

    #[test]
    fn test_keygen_small_modulus_needs_override() {
        let dir = TempDir::new().unwrap();
        let err = execute(parse(&dir, &["keygen", "-p", "13", "-q", "17"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RsaError>(),
            Some(RsaError::ModulusTooSmall { .. })
        ));

        let args = ["keygen", "-p", "13", "-q", "17", "--allow-small-modulus"];
        execute(parse(&dir, &args)).unwrap();
    }

    #[test]
    fn test_encrypt_with_mismatched_keys() {
        let dir = TempDir::new().unwrap();
        let input = path_arg(&dir, "message.txt");
        write_file(input.as_ref(), b"hello").unwrap();
        write_file(&dir.path().join("publicKey.rsa"), b"47 ca1").unwrap();
        write_file(&dir.path().join("privateKey.rsa"), b"317 c37").unwrap();

        let encrypted = path_arg(&dir, "encrypted.xx");
        let err = execute(parse(&dir, &["encrypt", &input, &encrypted])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FileError>(),
            Some(FileError::Crypto(RsaError::KeyMismatch { .. }))
        ));
        assert!(!dir.path().join("encrypted.xx").exists());
    }
}
