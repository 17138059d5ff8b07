//! cardvault-server: HTTP collaborator for the provisioning engine

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
