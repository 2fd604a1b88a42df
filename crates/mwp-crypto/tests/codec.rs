use mwp_crypto::{
    derive_shared_secret, generate_key_pair, Cipher, Compression, CryptoError, EncryptedEnvelope,
    PrivateKey, PublicKey,
};

fn session_secrets() -> (mwp_crypto::SharedSecret, mwp_crypto::SharedSecret) {
    let dapp = generate_key_pair();
    let wallet = generate_key_pair();
    (
        derive_shared_secret(&dapp.private_key, &wallet.public_key),
        derive_shared_secret(&wallet.private_key, &dapp.public_key),
    )
}

#[test]
fn round_trip_between_peers() {
    let (dapp_secret, wallet_secret) = session_secrets();

    for compression in [Compression::Zlib, Compression::Disabled] {
        let cipher = Cipher::new(compression);
        for message in [
            "",
            r#"{"action":{"method":"personal_sign","params":["0x68656c6c6f","0xabc"]},"chainId":8453}"#,
            "gm ☀️ 🌍 àéîõü",
        ] {
            let envelope = cipher.encrypt(&dapp_secret, message).unwrap();
            let decrypted = cipher.decrypt(&wallet_secret, &envelope).unwrap();
            assert_eq!(decrypted, message, "mode {compression:?}");
        }
    }
}

#[test]
fn tampered_cipher_text_fails_authentication() {
    let (secret, _) = session_secrets();
    let cipher = Cipher::default();
    let envelope = cipher.encrypt(&secret, "payload").unwrap();

    let (iv, mut cipher_text) = envelope.into_parts();
    cipher_text[0] ^= 0x01;
    let tampered = EncryptedEnvelope::new(iv, cipher_text);

    assert!(matches!(
        cipher.decrypt(&secret, &tampered),
        Err(CryptoError::DecryptionFailed)
    ));
}

#[test]
fn tampered_iv_fails_authentication() {
    let (secret, _) = session_secrets();
    let cipher = Cipher::default();
    let envelope = cipher.encrypt(&secret, "payload").unwrap();

    let (mut iv, cipher_text) = envelope.into_parts();
    iv[11] ^= 0x80;
    let tampered = EncryptedEnvelope::new(iv, cipher_text);

    assert!(matches!(
        cipher.decrypt(&secret, &tampered),
        Err(CryptoError::DecryptionFailed)
    ));
}

#[test]
fn unrelated_secret_cannot_decrypt() {
    let (secret, _) = session_secrets();
    let (other, _) = session_secrets();
    let cipher = Cipher::default();
    let envelope = cipher.encrypt(&secret, "payload").unwrap();

    assert!(matches!(
        cipher.decrypt(&other, &envelope),
        Err(CryptoError::DecryptionFailed)
    ));
}

#[test]
fn exported_keys_reimport_to_the_same_secret() {
    let dapp = generate_key_pair();
    let wallet = generate_key_pair();

    let private_hex = dapp.private_key.to_hex();
    let public_hex = wallet.public_key.to_hex().unwrap();

    let private_key = PrivateKey::from_hex(&private_hex).unwrap();
    let public_key = PublicKey::from_hex(&public_hex).unwrap();

    assert_eq!(private_key.to_public_key(), dapp.public_key);
    assert_eq!(
        derive_shared_secret(&private_key, &public_key),
        derive_shared_secret(&dapp.private_key, &wallet.public_key)
    );
}

#[test]
fn scalar_outside_curve_order_is_rejected() {
    let too_large = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    assert!(matches!(
        PrivateKey::from_hex(too_large),
        Err(CryptoError::InvalidKey)
    ));
}
