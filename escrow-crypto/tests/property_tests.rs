//! Property tests for the container and envelope guarantees.

use escrow_crypto::container::{decode_as, encode_as};
use escrow_crypto::{
    ContainerFormat, CryptoError, HEADER_SIZE, IV_SIZE, IdentityKeyPair, SessionKey, WrapScheme,
    decode, decrypt, encode, encrypt, generate_session_key, unwrap_key, wrap_key,
};
use proptest::prelude::*;
use std::sync::OnceLock;

fn shared_keypair() -> &'static IdentityKeyPair {
    static KEYPAIR: OnceLock<IdentityKeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(|| IdentityKeyPair::generate().expect("keygen"))
}

fn canonical_bytes(key: &SessionKey, plaintext: &[u8]) -> Vec<u8> {
    let sealed = encrypt(key, plaintext).unwrap();
    let iv: [u8; IV_SIZE] = sealed.iv.as_slice().try_into().unwrap();
    encode(&iv, &sealed.tag, &sealed.ciphertext)
}

proptest! {
    #[test]
    fn raw_container_round_trip(plaintext in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let key = generate_session_key();
        let bytes = canonical_bytes(&key, &plaintext);
        prop_assert_eq!(bytes.len(), HEADER_SIZE + plaintext.len());

        let opened = decrypt(&key, &decode(&bytes).unwrap()).unwrap();
        prop_assert_eq!(opened, plaintext);
    }

    #[test]
    fn every_format_round_trips(
        plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        format in prop_oneof![
            Just(ContainerFormat::Raw),
            Just(ContainerFormat::Versioned),
            Just(ContainerFormat::LegacyText),
        ],
    ) {
        let key = generate_session_key();
        let sealed = encrypt(&key, &plaintext).unwrap();
        let bytes = encode_as(format, &sealed).unwrap();
        let opened = decrypt(&key, &decode_as(format, &bytes).unwrap()).unwrap();
        prop_assert_eq!(opened, plaintext);
    }

    #[test]
    fn any_single_bit_flip_is_detected(
        plaintext in proptest::collection::vec(any::<u8>(), 0..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = generate_session_key();
        let mut bytes = canonical_bytes(&key, &plaintext);
        let idx = position.index(bytes.len());
        bytes[idx] ^= 1 << bit;

        let result = decrypt(&key, &decode(&bytes).unwrap());
        prop_assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn short_input_is_always_malformed(
        bytes in proptest::collection::vec(any::<u8>(), 0..HEADER_SIZE),
    ) {
        prop_assert!(matches!(decode(&bytes), Err(CryptoError::Malformed(_))));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn unwrap_inverts_wrap(raw in any::<[u8; 32]>(), legacy in any::<bool>()) {
        let kp = shared_keypair();
        let scheme = if legacy { WrapScheme::Pkcs1v15 } else { WrapScheme::Oaep };
        let key = SessionKey::from_bytes(raw);

        let wrapped = wrap_key(&key, &kp.public, scheme).unwrap();
        let recovered = unwrap_key(&wrapped, &kp.private, scheme).unwrap();
        prop_assert_eq!(recovered.as_bytes(), &raw);
    }
}
