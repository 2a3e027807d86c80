use std::{fs, path::PathBuf};

use avocado::{Avocado, AvocadoError, FileStoreConfig, StorageSpec};
use avocado_crypto::{keygen, load_private_key};

const PRIVATE_KEY: &str = include_str!("../../avocado-crypto/testdata/private_key.pem");

struct Fixture {
    _dir: tempfile::TempDir,
    avocado: Avocado,
    public_key: PathBuf,
    private_key: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let private_key = dir.path().join("privateKey_test.pem");
    fs::write(&private_key, PRIVATE_KEY).expect("write private key");

    let private = load_private_key(&private_key).expect("load private key");
    let public_key = dir.path().join("publicKey_test.pem");
    let public_pem = keygen::public_key_pem(&private.to_public_key()).expect("encode public key");
    fs::write(&public_key, public_pem).expect("write public key");

    let avocado = Avocado::configure(StorageSpec {
        file: Some(FileStoreConfig::new(dir.path().join("mytest.db"), "test")),
        redis: None,
    })
    .expect("configure");

    Fixture {
        _dir: dir,
        avocado,
        public_key,
        private_key,
    }
}

#[test]
fn encrypt_list_decrypt_delete() {
    let fx = fixture();

    let ciphertext = fx
        .avocado
        .encrypt_and_store(b"val1", b"Hello", &fx.public_key)
        .expect("encrypt and store");
    assert!(!ciphertext.is_empty());
    assert_ne!(ciphertext, b"Hello");

    let keys = fx.avocado.list_keys().expect("list keys");
    assert!(!keys.is_empty(), "at least one key should be present");
    assert!(keys.contains(&b"val1".to_vec()));

    let plain = fx
        .avocado
        .find_and_decrypt(b"val1", &fx.private_key)
        .expect("find and decrypt");
    assert_eq!(plain, b"Hello");

    fx.avocado.delete(b"val1").expect("delete");
    let err = fx
        .avocado
        .find_and_decrypt(b"val1", &fx.private_key)
        .expect_err("deleted value");
    assert!(matches!(err, AvocadoError::NotFound { .. }));

    fx.avocado.delete(b"val1").expect("second delete is a no-op");
}

#[test]
fn missing_key_is_not_found_even_before_first_write() {
    let fx = fixture();
    let err = fx
        .avocado
        .find_and_decrypt(b"never-stored", &fx.private_key)
        .expect_err("empty store");
    assert_eq!(
        err,
        AvocadoError::NotFound {
            key: "never-stored".into()
        }
    );

    fx.avocado
        .encrypt_and_store(b"other", b"value", &fx.public_key)
        .expect("store other");
    let err = fx
        .avocado
        .find_and_decrypt(b"never-stored", &fx.private_key)
        .expect_err("bucket exists, key does not");
    assert!(matches!(err, AvocadoError::NotFound { .. }));
}

#[test]
fn ciphertext_is_bound_to_its_key() {
    let fx = fixture();
    let sealed = fx
        .avocado
        .encrypt_and_store(b"k1", b"secret", &fx.public_key)
        .expect("store k1");

    // Re-file the k1 ciphertext under k2; the label no longer matches.
    let private = load_private_key(&fx.private_key).expect("private key");
    let err =
        avocado_crypto::oaep::decrypt(&private, &sealed, b"k2").expect_err("label mismatch");
    assert!(matches!(err, avocado_crypto::CryptoError::Decrypt { .. }));
}

#[test]
fn binary_keys_round_trip() {
    let fx = fixture();
    let key = [0xFF, 0x00, 0x10];
    fx.avocado
        .encrypt_and_store(&key, b"Hello", &fx.public_key)
        .expect("store under a non-UTF-8 key");

    assert_eq!(fx.avocado.list_keys().expect("keys"), vec![key.to_vec()]);
    assert_eq!(
        fx.avocado
            .find_and_decrypt(&key, &fx.private_key)
            .expect("decrypt"),
        b"Hello"
    );
}

#[test]
fn second_store_overwrites() {
    let fx = fixture();
    fx.avocado
        .encrypt_and_store(b"k", b"first", &fx.public_key)
        .expect("store");
    fx.avocado
        .encrypt_and_store(b"k", b"second", &fx.public_key)
        .expect("overwrite");

    assert_eq!(fx.avocado.list_keys().expect("keys"), vec![b"k".to_vec()]);
    assert_eq!(
        fx.avocado
            .find_and_decrypt(b"k", &fx.private_key)
            .expect("decrypt"),
        b"second"
    );
}

#[test]
fn oversized_value_is_encrypt_error_and_not_stored() {
    let fx = fixture();
    let too_long = vec![b'x'; 256 - 2 * 32 - 2 + 1];
    let err = fx
        .avocado
        .encrypt_and_store(b"big", &too_long, &fx.public_key)
        .expect_err("too long for the key");
    assert!(matches!(err, AvocadoError::Encrypt { .. }));
    assert!(fx.avocado.list_keys().expect("keys").is_empty());
}

#[test]
fn missing_key_files_are_io_errors() {
    let fx = fixture();
    let err = fx
        .avocado
        .encrypt_and_store(b"k", b"v", fx.public_key.with_extension("missing"))
        .expect_err("missing public key");
    assert!(matches!(err, AvocadoError::Io { .. }));

    fx.avocado
        .encrypt_and_store(b"k", b"v", &fx.public_key)
        .expect("store");
    let err = fx
        .avocado
        .find_and_decrypt(b"k", fx.private_key.with_extension("missing"))
        .expect_err("missing private key");
    assert!(matches!(err, AvocadoError::Io { .. }));
}

#[test]
fn wrong_key_type_is_format_error() {
    let fx = fixture();
    let err = fx
        .avocado
        .encrypt_and_store(b"k", b"v", &fx.private_key)
        .expect_err("private key is not a public key");
    assert!(matches!(err, AvocadoError::Format { .. }));
}
