use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

/// A custodial identity: one RSA keypair plus registration metadata.
#[derive(Clone)]
pub struct Identity {
    pub identity_id: String,
    /// SPKI PEM.
    pub public_key_pem: String,
    /// PKCS#8 PEM. Never leaves the authority.
    pub private_key_pem: Zeroizing<String>,
    pub created_at: DateTime<Utc>,
    pub origin_ip: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("identity_id", &self.identity_id)
            .field("created_at", &self.created_at)
            .field("origin_ip", &self.origin_ip)
            .field("private_key_pem", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Input for [`crate::EscrowStore::store_wrapped_key`].
#[derive(Clone, Debug)]
pub struct NewEscrowRecord {
    pub identity_id: String,
    pub wrapped_key: Vec<u8>,
    pub files_count: u32,
    pub origin_ip: String,
}

/// One escrowed wrapped session key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowRecord {
    /// Insertion order; higher is newer.
    pub id: i64,
    pub identity_id: String,
    pub wrapped_key: Vec<u8>,
    pub files_count: u32,
    pub received_at: DateTime<Utc>,
    pub origin_ip: String,
}
