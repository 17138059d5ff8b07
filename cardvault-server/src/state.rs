use std::sync::Arc;
use std::time::Duration;

use cardvault_core::{DigestAlgorithm, EscalationLadder, ProvisioningEngine, RetryPolicy};
use cardvault_storage::{InMemoryStore, KeyedStore, SqliteStore, StoreDescriptor};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProvisioningEngine>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // Build store backend
        let descriptor: StoreDescriptor = config.storage.descriptor.parse()?;
        let busy_timeout = Duration::from_millis(config.storage.busy_timeout_ms);
        let store: Arc<dyn KeyedStore> = match &descriptor {
            StoreDescriptor::Memory => {
                tracing::warn!("Using in-memory card store - contents are lost on restart");
                Arc::new(InMemoryStore::new())
            }
            StoreDescriptor::SqliteInMemory => Arc::new(SqliteStore::in_memory()?),
            StoreDescriptor::SqliteFile(path) => Arc::new(SqliteStore::open(path, busy_timeout)?),
        };

        let initial: DigestAlgorithm = config.provisioning.initial_algorithm.parse()?;
        let retry = RetryPolicy::new(
            config.provisioning.max_retries,
            Duration::from_millis(config.provisioning.base_delay_ms),
        );

        let engine = ProvisioningEngine::builder(store)
            .ladder(EscalationLadder::starting_at(initial))
            .retry_policy(retry)
            .max_content_size(config.provisioning.max_content_size)
            .build();

        tracing::info!(
            store = %descriptor,
            algorithm = %initial,
            max_retries = retry.max_retries,
            "provisioning engine ready"
        );

        Ok(Self {
            engine: Arc::new(engine),
        })
    }
}
