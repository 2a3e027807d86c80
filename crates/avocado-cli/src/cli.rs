use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "avocado",
    about = "Seal values with RSA-OAEP and keep them in a key-value store",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Encrypt a value and store it under a key; prints the ciphertext (base64).
    Store {
        key: String,
        value: String,
        /// PEM public key; defaults to the configured one.
        #[arg(long)]
        public_key: Option<PathBuf>,
    },
    /// Fetch and decrypt the value stored under a key.
    Find {
        key: String,
        /// PEM private key; defaults to the configured one.
        #[arg(long)]
        private_key: Option<PathBuf>,
    },
    /// List stored keys.
    List,
    /// Delete a key (no error if absent).
    Delete { key: String },
    /// Generate an RSA key pair as private.pem / public.pem.
    Keygen {
        /// Output directory; defaults to the data directory's `keys` folder.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 2048)]
        bits: usize,
    },
    /// Run a store/find/delete round-trip against the configured backend and keys.
    Health,
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
