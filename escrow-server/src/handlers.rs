//! HTTP handlers, one module per resource.
//!
//! ## Endpoints
//!
//! - GET /health - liveness probe
//! - POST /identities - issue a new identity
//! - POST /identities/{id}/keys - escrow a wrapped session key
//! - POST /recover - unwrap the latest escrowed key for an identity
//! - GET /escrow/records - newest escrow records, metadata only

pub mod health;
pub mod identities;
pub mod recover;
pub mod records;
