//! Shared helpers for escrow client tests.
#![allow(dead_code)]

use escrow_client::ClientConfig;
use escrow_crypto::IdentityKeyPair;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// RSA generation is slow; tests share two keypairs.
pub fn keypair_a() -> &'static IdentityKeyPair {
    static KEYPAIR: OnceLock<IdentityKeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(|| IdentityKeyPair::generate().unwrap())
}

pub fn keypair_b() -> &'static IdentityKeyPair {
    static KEYPAIR: OnceLock<IdentityKeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(|| IdentityKeyPair::generate().unwrap())
}

/// Body of a `201 POST /identities` response.
pub fn identity_json(identity_id: &str, keypair: &IdentityKeyPair) -> serde_json::Value {
    json!({
        "identityId": identity_id,
        "publicKey": keypair.public_key_pem().unwrap(),
    })
}

/// Client config against `server_uri` with the identity cached under `dir`.
pub fn config(server_uri: &str, dir: &Path) -> ClientConfig {
    ClientConfig::new(server_uri, dir.join("identity.json"))
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
