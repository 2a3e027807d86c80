//! RSA key handling and OAEP sealing for Avocado.
//! The OAEP math and PEM/DER parsing come from the RustCrypto crates; this crate wires them.

pub mod error;
pub mod key_loader;
pub mod keygen;
mod legacy_pem;
pub mod oaep;

pub use error::CryptoError;
pub use key_loader::{load_private_key, load_public_key};
pub use rsa::{RsaPrivateKey, RsaPublicKey};
