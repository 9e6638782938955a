//! LedgerFC CLI
//!
//! Command-line interface for LedgerFC keys, signatures and varint encodings.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ledgerfc_core::raw::{self, SignedInt, UnsignedInt};
use ledgerfc_core::CodecConfig;
use ledgerfc_crypto::hash::sha256;
use ledgerfc_crypto::{PrivateKey, PublicKey, Signature, Suite};

/// LedgerFC - keys and wire encodings for ledger software
#[derive(Parser)]
#[command(name = "ledgerfc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SuiteArg {
    K1,
    R1,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::K1 => Suite::K1,
            SuiteArg::R1 => Suite::R1,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key pair
    Generate {
        /// Signature suite
        #[arg(short, long, value_enum, default_value = "k1")]
        suite: SuiteArg,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a public key, private key or signature string
    Inspect {
        /// Canonical or legacy key text
        key: String,
    },

    /// Derive the public key of a private key
    Public {
        /// Private key (PVT_... or WIF)
        private: String,
    },

    /// Sign the SHA-256 digest of a message
    Sign {
        /// Private key (PVT_... or WIF)
        #[arg(short, long, env = "LEDGERFC_PRIVATE_KEY", hide_env_values = true)]
        key: String,
        /// Message to sign
        message: String,
    },

    /// Recover the signer of a message
    Recover {
        /// Signature (SIG_...)
        #[arg(short, long)]
        signature: String,
        /// Signed message
        message: String,
    },

    /// Encode an integer as a varint
    Varint {
        /// Use the zig-zag signed encoding
        #[arg(long)]
        signed: bool,
        /// Value to encode
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Decode a hex varint
    Unvarint {
        /// Use the zig-zag signed encoding
        #[arg(long)]
        signed: bool,
        /// Hex bytes
        hex: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "ledgerfc_core=debug,ledgerfc_crypto=debug,info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CodecConfig::from_env();

    match cli.command {
        Commands::Generate { suite, json } => cmd_generate(suite.into(), json),
        Commands::Inspect { key } => cmd_inspect(&key),
        Commands::Public { private } => cmd_public(&private),
        Commands::Sign { key, message } => cmd_sign(&key, &message),
        Commands::Recover { signature, message } => cmd_recover(&signature, &message),
        Commands::Varint { signed, value } => cmd_varint(signed, &value),
        Commands::Unvarint { signed, hex } => cmd_unvarint(signed, &hex, config),
    }
}

/// Generate a key pair
fn cmd_generate(suite: Suite, json: bool) -> Result<()> {
    let private = PrivateKey::generate(suite).context("Failed to generate key")?;
    let public = private.public_key().context("Failed to derive public key")?;

    if json {
        let keys_json = serde_json::json!({
            "suite": suite.as_str(),
            "private_key": private.to_string(),
            "public_key": public.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&keys_json)?);
        return Ok(());
    }

    println!("{} {}", "Generated key pair:".cyan().bold(), suite);
    println!("   {} {}", "Private:".dimmed(), private);
    println!("   {} {}", "Public: ".dimmed(), public);
    println!("\n{}", "Keep the private key secret.".red().bold());
    Ok(())
}

/// Decode any key text and show its parts
fn cmd_inspect(text: &str) -> Result<()> {
    if let Ok(public) = text.parse::<PublicKey>() {
        println!("{} {}", "Public key".green().bold(), public.suite());
        println!("   {} {}", "Canonical:".dimmed(), public);
        println!("   {} {}", "Raw:".dimmed(), hex::encode(raw::pack(&public)?));
        if let Ok(point) = public.to_uncompressed() {
            println!("   {} {}", "Uncompressed:".dimmed(), hex::encode(point));
        }
        return Ok(());
    }

    if let Ok(signature) = text.parse::<Signature>() {
        println!("{} {}", "Signature".green().bold(), signature.suite());
        println!("   {} {}", "Raw:".dimmed(), hex::encode(raw::pack(&signature)?));
        return Ok(());
    }

    match text.parse::<PrivateKey>() {
        Ok(private) => {
            println!("{} {}", "Private key".green().bold(), private.suite());
            println!("   {} {}", "Public:".dimmed(), private.public_key()?);
            Ok(())
        }
        Err(e) => {
            debug!(error = %e, "Inspect failed");
            bail!("Unrecognized key text: {e}")
        }
    }
}

/// Print the public key of a private key
fn cmd_public(private: &str) -> Result<()> {
    let private: PrivateKey = private.parse().context("Invalid private key")?;
    println!("{}", private.public_key()?);
    Ok(())
}

/// Sign a message digest
fn cmd_sign(key: &str, message: &str) -> Result<()> {
    let private: PrivateKey = key.parse().context("Invalid private key")?;
    let digest = sha256(message.as_bytes());
    let signature = private.sign(&digest).context("Failed to sign")?;

    println!("{} {}", "Digest:   ".dimmed(), hex::encode(digest));
    println!("{} {}", "Signature:".dimmed(), signature);
    Ok(())
}

/// Recover the public key from a signature
fn cmd_recover(signature: &str, message: &str) -> Result<()> {
    let signature: Signature = signature.parse().context("Invalid signature")?;
    let digest = sha256(message.as_bytes());
    let public = PublicKey::recover(&signature, &digest).context("Failed to recover key")?;

    println!("{} {}", "Signer:".green().bold(), public);
    Ok(())
}

/// Encode a varint
fn cmd_varint(signed: bool, value: &str) -> Result<()> {
    let bytes = if signed {
        let value: i32 = value.parse().context("Expected a 32-bit signed integer")?;
        raw::pack(&SignedInt(value))?
    } else {
        let value: u32 = value.parse().context("Expected a 32-bit unsigned integer")?;
        raw::pack(&UnsignedInt(value))?
    };
    println!("{}", hex::encode(bytes));
    Ok(())
}

/// Decode a varint
fn cmd_unvarint(signed: bool, text: &str, config: CodecConfig) -> Result<()> {
    let bytes = hex::decode(text.trim()).context("Invalid hex")?;
    if signed {
        let value: SignedInt = raw::unpack_exact(&bytes, config).context("Invalid signed varint")?;
        println!("{}", value);
    } else {
        let value: UnsignedInt =
            raw::unpack_exact(&bytes, config).context("Invalid unsigned varint")?;
        println!("{}", value);
    }
    Ok(())
}
