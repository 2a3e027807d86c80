mod cli;
mod config;
mod storage;

use std::path::Path;

use avocado::Avocado;
use avocado_crypto::keygen;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand};

const HEALTH_KEY_PREFIX: &str = "avocado/health-check";

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Store {
            key,
            value,
            public_key,
        } => {
            let avocado = storage::open_from_config(&config)?;
            let public_key = storage::public_key_path(&config, public_key)?;
            let ciphertext =
                avocado.encrypt_and_store(key.as_bytes(), value.as_bytes(), public_key)?;
            println!("{}", STANDARD.encode(ciphertext));
        }
        Command::Find { key, private_key } => {
            let avocado = storage::open_from_config(&config)?;
            let private_key = storage::private_key_path(&config, private_key)?;
            let plaintext = avocado.find_and_decrypt(key.as_bytes(), private_key)?;
            println!("{}", String::from_utf8_lossy(&plaintext));
        }
        Command::List => {
            let avocado = storage::open_from_config(&config)?;
            let keys = avocado.list_keys()?;
            if keys.is_empty() {
                println!("No keys yet. Add one with `avocado store <key> <value>`.");
            }
            for key in keys {
                println!("{}", String::from_utf8_lossy(&key));
            }
        }
        Command::Delete { key } => {
            let avocado = storage::open_from_config(&config)?;
            avocado.delete(key.as_bytes())?;
            println!("Deleted {key}");
        }
        Command::Keygen { out_dir, bits } => {
            let dir = match out_dir {
                Some(dir) => dir,
                None => storage::default_keys_dir()?,
            };
            run_keygen(&dir, bits)?;
        }
        Command::Health => run_health_check(&config)?,
        Command::Version => print_version(),
        Command::Config(ConfigCommand::Init) => init_config(cli.config.as_deref())?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("avocado {}", env!("CARGO_PKG_VERSION"));
}

fn run_keygen(dir: &Path, bits: usize) -> Result<()> {
    let pair = keygen::generate_key_pair(bits)?;
    let paths = keygen::write_key_pair(dir, &pair)?;
    println!("Private key: {}", paths.private.display());
    println!("Public key:  {}", paths.public.display());
    Ok(())
}

/// Runs a quick health check of the configured backend and key pair.
fn run_health_check(config: &config::Config) -> Result<()> {
    let avocado = storage::open_from_config(config)?;
    let public_key = storage::public_key_path(config, None)?;
    let private_key = storage::private_key_path(config, None)?;
    run_store_health(&avocado, &public_key, &private_key)?;
    println!("Storage ({}): ok", avocado.storage().backend_name());
    Ok(())
}

/// Seals, reopens and deletes a value under a fresh key that no user entry occupies.
fn run_store_health(avocado: &Avocado, public_key: &Path, private_key: &Path) -> Result<()> {
    let key = unused_health_key(avocado)?;
    let payload = b"ok";
    avocado.encrypt_and_store(&key, payload, public_key)?;
    let round_trip = avocado.find_and_decrypt(&key, private_key);
    // Clean up even when decryption failed.
    avocado.delete(&key)?;

    if round_trip? != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn unused_health_key(avocado: &Avocado) -> Result<Vec<u8>> {
    let existing = avocado.list_keys()?;
    loop {
        let key = format!("{HEALTH_KEY_PREFIX}/{:016x}", rand::random::<u64>()).into_bytes();
        if !existing.contains(&key) {
            return Ok(key);
        }
    }
}

fn init_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::default_path()?,
    };
    let data_dir = storage::default_data_dir()?;
    let keys_dir = storage::default_keys_dir()?;
    let defaults = config::Config {
        public_key: Some(keys_dir.join(keygen::PUBLIC_KEY_FILE)),
        private_key: Some(keys_dir.join(keygen::PRIVATE_KEY_FILE)),
        file: Some(storage::default_file_store(&data_dir)),
        redis: None,
    };
    let path = config::write_if_missing(&defaults, &path)?;
    info!(path = %path.display(), "config ready");
    println!("Config initialized at {}", path.display());
    Ok(())
}
