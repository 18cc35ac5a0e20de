//! Command-line front-end for the `textbook_rsa` library: key generation,
//! encryption, decryption, and public-key extraction.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use rand::thread_rng;

use textbook_rsa::codec::Message;
use textbook_rsa::error::{Error, Result};
use textbook_rsa::key::{Key, PrivateKey, PublicKey};

const STDIO_MARKER: &str = "-";

#[derive(Parser)]
#[command(
    name = "textbook-rsa",
    about = "Didactic textbook RSA: key generation, encryption, decryption, public-key extraction",
    long_about = "A from-scratch textbook RSA implementation. No padding, no constant-time \
                  arithmetic, no secure-randomness guarantee: this is for learning the number \
                  theory underneath RSA, not for protecting anything."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a private key and its public counterpart.
    Keygen {
        /// Bit length of each of the two generated primes.
        nbits: u32,
        /// Where to write the private key (`-` for stdout; no `.pub` sibling is written in that case).
        outfile: PathBuf,
    },
    /// Encrypt a file against a key's public view.
    Encrypt {
        /// Path to a key file (public or private; only the public view is used).
        keyfile: PathBuf,
        /// Path to the plaintext (`-` for stdin).
        infile: PathBuf,
        /// Where to write the ciphertext package.
        outfile: PathBuf,
    },
    /// Decrypt a ciphertext package with a private key.
    Decrypt {
        /// Path to a private key file.
        keyfile: PathBuf,
        /// Path to the ciphertext package (`-` for stdin).
        infile: PathBuf,
        /// Where to write the decoded plaintext (`-` for stdout).
        outfile: PathBuf,
    },
    /// Derive and save the public view of a key.
    Publicextract {
        /// Path to a private key file.
        infile: PathBuf,
        /// Where to write the derived public key.
        outfile: PathBuf,
    },
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == STDIO_MARKER {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read(path)?)
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if path.as_os_str() == STDIO_MARKER {
        io::stdout().write_all(data)?;
        Ok(())
    } else {
        fs::write(path, data)?;
        Ok(())
    }
}

fn load_key(path: &Path) -> Result<Key> {
    let bytes = read_input(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::KeyLoadError(e.to_string()))
}

fn pub_sibling(outfile: &Path) -> PathBuf {
    let mut s = outfile.as_os_str().to_owned();
    s.push(".pub");
    PathBuf::from(s)
}

fn run_keygen(nbits: u32, outfile: &Path) -> Result<()> {
    if nbits < 8 {
        return Err(Error::InvalidParameter(format!(
            "nbits must be at least 8, got {nbits}"
        )));
    }

    info!("generating a {nbits}-bit RSA private key");
    let mut rng = thread_rng();
    let private = PrivateKey::generate(nbits, &mut rng)?;
    let public = private.get_public();

    let key: Key = private.into();
    let key_json = serde_json::to_vec_pretty(&key).map_err(|e| Error::KeyLoadError(e.to_string()))?;
    write_output(outfile, &key_json)?;

    if outfile.as_os_str() != STDIO_MARKER {
        let public_key: Key = public.into();
        let public_json =
            serde_json::to_vec_pretty(&public_key).map_err(|e| Error::KeyLoadError(e.to_string()))?;
        write_output(&pub_sibling(outfile), &public_json)?;
    }

    Ok(())
}

fn run_encrypt(keyfile: &Path, infile: &Path, outfile: &Path) -> Result<()> {
    let key = load_key(keyfile)?;
    let public = key.as_public();

    let plaintext = read_input(infile)?;
    let message = Message::encode(&plaintext, public.n())?;
    let ciphertext = public.encrypt(&message);

    info!("encrypted {} byte(s) into {} block(s)", plaintext.len(), ciphertext.numbers().len());

    let package = (public, ciphertext);
    let package_json = serde_json::to_vec_pretty(&package).map_err(|e| Error::KeyLoadError(e.to_string()))?;
    write_output(outfile, &package_json)
}

fn run_decrypt(keyfile: &Path, infile: &Path, outfile: &Path) -> Result<()> {
    let key = load_key(keyfile)?;
    let private = key.as_private()?;

    let package_bytes = read_input(infile)?;
    let (embedded_key, ciphertext): (PublicKey, Message) =
        serde_json::from_slice(&package_bytes).map_err(|e| Error::KeyLoadError(e.to_string()))?;

    if embedded_key != private.get_public() {
        return Err(Error::WrongKeyForCiphertext);
    }

    let message = private.decrypt(&ciphertext);
    let plaintext = message.decode()?;

    info!("decrypted {} block(s) into {} byte(s)", ciphertext.numbers().len(), plaintext.len());

    write_output(outfile, &plaintext)
}

fn run_publicextract(infile: &Path, outfile: &Path) -> Result<()> {
    let key = load_key(infile)?;

    if key.is_public() {
        return Err(Error::KeyLacksCapability("public extraction (already public)"));
    }

    let public: Key = key.as_public().into();
    let public_json = serde_json::to_vec_pretty(&public).map_err(|e| Error::KeyLoadError(e.to_string()))?;
    write_output(outfile, &public_json)
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Keygen { nbits, outfile } => run_keygen(nbits, &outfile),
        Command::Encrypt {
            keyfile,
            infile,
            outfile,
        } => run_encrypt(&keyfile, &infile, &outfile),
        Command::Decrypt {
            keyfile,
            infile,
            outfile,
        } => run_decrypt(&keyfile, &infile, &outfile),
        Command::Publicextract { infile, outfile } => run_publicextract(&infile, &outfile),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
