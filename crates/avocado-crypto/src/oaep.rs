//! RSA-OAEP with SHA-256 for both the digest and MGF1.
//!
//! The label binds a ciphertext to the storage key it was filed under: decrypting
//! with any other label fails.

use getrandom::SysRng;
use rsa::{
    rand_core::UnwrapErr, sha2::Sha256, traits::PublicKeyParts, Oaep, RsaPrivateKey, RsaPublicKey,
};

use crate::CryptoError;

const HASH_LEN: usize = 32;

/// Largest plaintext the key can seal: `k - 2*hLen - 2`.
pub fn max_plaintext_len(public_key: &RsaPublicKey) -> usize {
    public_key.size().saturating_sub(2 * HASH_LEN + 2)
}

pub fn encrypt(
    public_key: &RsaPublicKey,
    plaintext: &[u8],
    label: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let limit = max_plaintext_len(public_key);
    if plaintext.len() > limit {
        return Err(CryptoError::Encrypt {
            reason: format!(
                "plaintext is {} bytes but a {}-bit key seals at most {limit}",
                plaintext.len(),
                public_key.size() * 8
            ),
        });
    }

    public_key
        .encrypt(&mut UnwrapErr(SysRng), padding(label), plaintext)
        .map_err(|e| CryptoError::Encrypt {
            reason: e.to_string(),
        })
}

pub fn decrypt(
    private_key: &RsaPrivateKey,
    ciphertext: &[u8],
    label: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    private_key
        .decrypt(padding(label), ciphertext)
        .map_err(|e| CryptoError::Decrypt {
            reason: e.to_string(),
        })
}

fn padding(label: &[u8]) -> Oaep<Sha256> {
    Oaep::new_with_label(label)
}

#[cfg(test)]
mod tests {
    use rsa::pkcs1::DecodeRsaPrivateKey;

    use super::*;

    fn fixture() -> RsaPrivateKey {
        let block = pem::parse(include_str!("../testdata/private_key.pem")).expect("pem");
        RsaPrivateKey::from_pkcs1_der(block.contents()).expect("fixture key")
    }

    #[test]
    fn round_trip_with_matching_label() {
        let private = fixture();
        let public = private.to_public_key();

        let sealed = encrypt(&public, b"Hello", b"val1").expect("encrypt");
        assert_ne!(sealed, b"Hello");
        assert_eq!(sealed.len(), public.size());

        let opened = decrypt(&private, &sealed, b"val1").expect("decrypt");
        assert_eq!(opened, b"Hello");
    }

    #[test]
    fn label_mismatch_fails() {
        let private = fixture();
        let sealed = encrypt(&private.to_public_key(), b"Hello", b"k1").expect("encrypt");

        let err = decrypt(&private, &sealed, b"k2").expect_err("label mismatch");
        assert!(matches!(err, CryptoError::Decrypt { .. }));
    }

    #[test]
    fn encryption_is_randomized() {
        let public = fixture().to_public_key();
        let first = encrypt(&public, b"Hello", b"val1").expect("encrypt");
        let second = encrypt(&public, b"Hello", b"val1").expect("encrypt");
        assert_ne!(first, second);
    }

    #[test]
    fn plaintext_length_boundary() {
        let private = fixture();
        let public = private.to_public_key();
        let limit = max_plaintext_len(&public);
        assert_eq!(limit, 256 - 2 * 32 - 2);

        let at_limit = vec![0x41u8; limit];
        let sealed = encrypt(&public, &at_limit, b"k").expect("limit fits");
        assert_eq!(decrypt(&private, &sealed, b"k").expect("decrypt"), at_limit);

        let over = vec![0x41u8; limit + 1];
        let err = encrypt(&public, &over, b"k").expect_err("one byte too many");
        assert!(matches!(err, CryptoError::Encrypt { .. }));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let private = fixture();
        let mut sealed = encrypt(&private.to_public_key(), b"Hello", b"k").expect("encrypt");
        sealed[10] ^= 0xFF;
        let err = decrypt(&private, &sealed, b"k").expect_err("tampered");
        assert!(matches!(err, CryptoError::Decrypt { .. }));
    }

    #[test]
    fn binary_labels_are_bound_byte_for_byte() {
        let private = fixture();
        let label = [0xFF, 0x00, 0x10];
        let sealed = encrypt(&private.to_public_key(), b"Hello", &label).expect("encrypt");

        assert_eq!(decrypt(&private, &sealed, &label).expect("decrypt"), b"Hello");
        let err = decrypt(&private, &sealed, &[0xFF, 0x00]).expect_err("truncated label");
        assert!(matches!(err, CryptoError::Decrypt { .. }));
    }
}
