use escrow_client::ClientError;

#[test]
fn api_error_display() {
    let err = ClientError::Api {
        status: 503,
        message: "unavailable".into(),
    };
    assert_eq!(err.to_string(), "API request failed (503): unavailable");
}

#[test]
fn identity_not_found_display() {
    let err = ClientError::IdentityNotFound("abc".into());
    assert_eq!(err.to_string(), "identity not known to server: abc");
}

#[test]
fn no_escrow_record_display() {
    let err = ClientError::NoEscrowRecord("abc".into());
    assert_eq!(err.to_string(), "no escrow record for identity abc");
}

#[test]
fn no_identity_display() {
    assert_eq!(
        ClientError::NoIdentity.to_string(),
        "no identity available; encrypt something first"
    );
}

#[test]
fn crypto_error_converts() {
    let err: ClientError = escrow_crypto::CryptoError::Authentication.into();
    assert!(matches!(err, ClientError::Crypto(_)));
    assert!(err.to_string().starts_with("crypto error:"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: ClientError = io.into();
    assert_eq!(err.to_string(), "I/O error: denied");
}

#[test]
fn serialization_error_converts() {
    let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
    let err: ClientError = json_err.into();
    assert!(err.to_string().starts_with("serialization error:"));
}

#[test]
fn config_error_display() {
    let err = ClientError::Config("missing url".into());
    assert_eq!(err.to_string(), "invalid configuration: missing url");
}
