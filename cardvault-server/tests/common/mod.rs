use std::net::SocketAddr;
use tokio::net::TcpListener;

use cardvault_server::config::{Config, ProvisioningConfig, StorageConfig};

/// Body cap used by every test server
pub const TEST_MAX_CONTENT: usize = 4096;

pub struct TestServer {
    pub url: String,
    #[allow(dead_code)]
    pub addr: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0, // OS assigns port
            storage: StorageConfig::default(),
            provisioning: ProvisioningConfig {
                initial_algorithm: "md5".into(),
                max_content_size: TEST_MAX_CONTENT,
                ..Default::default()
            },
        };

        let state = cardvault_server::state::AppState::new(&config).unwrap();
        let app = cardvault_server::routes::router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            url: format!("http://{addr}"),
            addr,
        }
    }
}
