use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use pem::{EncodeConfig, LineEnding, Pem};
use getrandom::SysRng;
use rsa::{
    pkcs1::EncodeRsaPrivateKey, pkcs8::EncodePublicKey, rand_core::UnwrapErr, RsaPrivateKey,
    RsaPublicKey,
};
use tracing::{info, instrument};

use crate::CryptoError;

pub const PRIVATE_KEY_FILE: &str = "private.pem";
pub const PUBLIC_KEY_FILE: &str = "public.pem";

/// Smallest modulus we are willing to generate.
pub const MIN_KEY_BITS: usize = 2048;

/// Freshly generated RSA key pair.
pub struct KeyPair {
    pub private: RsaPrivateKey,
    pub public: RsaPublicKey,
}

/// Paths written by [`write_key_pair`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub private: PathBuf,
    pub public: PathBuf,
}

#[instrument]
pub fn generate_key_pair(bits: usize) -> Result<KeyPair, CryptoError> {
    if bits < MIN_KEY_BITS {
        return Err(CryptoError::KeyGen {
            reason: format!("{bits}-bit keys are too small (minimum {MIN_KEY_BITS})"),
        });
    }
    let private = RsaPrivateKey::new(&mut UnwrapErr(SysRng), bits).map_err(|e| CryptoError::KeyGen {
        reason: e.to_string(),
    })?;
    let public = private.to_public_key();
    Ok(KeyPair { private, public })
}

/// PKCS#1 private key as an unencrypted `RSA PRIVATE KEY` PEM block.
pub fn private_key_pem(key: &RsaPrivateKey) -> Result<String, CryptoError> {
    let der = key.to_pkcs1_der().map_err(|e| CryptoError::KeyGen {
        reason: e.to_string(),
    })?;
    Ok(encode("RSA PRIVATE KEY", der.as_bytes()))
}

/// PKIX public key wrapped in an `RSA PUBLIC KEY` PEM block, the layout the loader reads.
pub fn public_key_pem(key: &RsaPublicKey) -> Result<String, CryptoError> {
    let der = key.to_public_key_der().map_err(|e| CryptoError::KeyGen {
        reason: e.to_string(),
    })?;
    Ok(encode("RSA PUBLIC KEY", der.as_bytes()))
}

/// Write `private.pem` and `public.pem` into `dir`. Existing files are never overwritten.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_key_pair(dir: &Path, pair: &KeyPair) -> Result<KeyPaths, CryptoError> {
    let paths = KeyPaths {
        private: dir.join(PRIVATE_KEY_FILE),
        public: dir.join(PUBLIC_KEY_FILE),
    };
    fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    write_new(&paths.private, private_key_pem(&pair.private)?.as_bytes(), 0o600)?;
    write_new(&paths.public, public_key_pem(&pair.public)?.as_bytes(), 0o644)?;
    info!("wrote key pair");
    Ok(paths)
}

fn encode(tag: &str, der: &[u8]) -> String {
    pem::encode_config(
        &Pem::new(tag, der.to_vec()),
        EncodeConfig::new().set_line_ending(LineEnding::LF),
    )
}

fn write_new(path: &Path, contents: &[u8], mode: u32) -> Result<(), CryptoError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).map_err(|e| io_err(path, e))?;
    file.write_all(contents).map_err(|e| io_err(path, e))?;
    file.flush().map_err(|e| io_err(path, e))
}

fn io_err(path: &Path, err: std::io::Error) -> CryptoError {
    CryptoError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
