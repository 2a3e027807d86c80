use std::{fs, path::Path};

use rsa::{pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePublicKey, RsaPrivateKey, RsaPublicKey};
use tracing::{debug, instrument, warn};

use crate::{legacy_pem, CryptoError};

/// Load an RSA public key from a PEM file holding a PKIX (SubjectPublicKeyInfo) body.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_public_key(path: impl AsRef<Path>) -> Result<RsaPublicKey, CryptoError> {
    let der = read_pem_body(path.as_ref())?;
    RsaPublicKey::from_public_key_der(&der).map_err(|e| CryptoError::Format {
        reason: format!("not a PKIX RSA public key: {e}"),
    })
}

/// Load an RSA private key from a PEM file holding a PKCS#1 body.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_private_key(path: impl AsRef<Path>) -> Result<RsaPrivateKey, CryptoError> {
    let der = read_pem_body(path.as_ref())?;
    RsaPrivateKey::from_pkcs1_der(&der).map_err(|e| CryptoError::Format {
        reason: format!("not a PKCS#1 RSA private key: {e}"),
    })
}

/// Read the file and return the DER body of its first PEM block, decrypting legacy blocks.
fn read_pem_body(path: &Path) -> Result<Vec<u8>, CryptoError> {
    let contents = fs::read(path).map_err(|e| CryptoError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let block = pem::parse(&contents).map_err(|e| CryptoError::Format {
        reason: format!("no PEM block in {}: {e}", path.display()),
    })?;
    debug!(tag = block.tag(), "decoded PEM block");

    if legacy_pem::is_encrypted(&block) {
        warn!("key file uses deprecated encrypted PEM; decrypting with an empty password");
        return legacy_pem::decrypt(&block, b"");
    }
    Ok(block.into_contents())
}
