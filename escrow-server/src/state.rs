use std::sync::Arc;

use escrow_storage::{EscrowStore, IdentityStore};

use crate::{
    config::ServerConfig,
    services::{IdentityAuthority, KeyEscrow, RecoveryService},
};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<ServerConfig>,
    /// Identity issuance.
    pub authority: IdentityAuthority,
    /// Wrapped-key intake.
    pub escrow: KeyEscrow,
    /// Key recovery.
    pub recovery: RecoveryService,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        identities: Arc<dyn IdentityStore>,
        records: Arc<dyn EscrowStore>,
    ) -> Self {
        let authority = IdentityAuthority::new(identities);
        let recovery = RecoveryService::new(
            authority.clone(),
            Arc::clone(&records),
            config.wrap_scheme,
        );
        Self {
            authority,
            escrow: KeyEscrow::new(records),
            recovery,
            config: Arc::new(config),
        }
    }
}
