use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use server::ServeConfig;
use server::identity::{CLIENT_FINGERPRINT, CLIENT_ISSUER_DN, CLIENT_SERIAL, CLIENT_SUBJECT_DN, CLIENT_VERIFY};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Certificate headers as the mTLS-terminating proxy would forward them.
#[derive(Debug, Clone, Default)]
pub struct ProxyHeaders {
    verify: Option<String>,
    subject_dn: Option<String>,
    issuer_dn: Option<String>,
    serial: Option<String>,
    fingerprint: Option<String>,
}

impl ProxyHeaders {
    /// Headers for a certificate the proxy accepted.
    pub fn verified() -> Self {
        Self::with_verify("SUCCESS")
    }

    /// Headers with an arbitrary verification outcome.
    pub fn with_verify(verify: impl Into<String>) -> Self {
        Self {
            verify: Some(verify.into()),
            ..Default::default()
        }
    }

    pub fn subject_dn(mut self, dn: impl Into<String>) -> Self {
        self.subject_dn = Some(dn.into());
        self
    }

    pub fn issuer_dn(mut self, dn: impl Into<String>) -> Self {
        self.issuer_dn = Some(dn.into());
        self
    }

    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    fn into_header_map(self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let pairs = [
            (CLIENT_VERIFY, self.verify),
            (CLIENT_SUBJECT_DN, self.subject_dn),
            (CLIENT_ISSUER_DN, self.issuer_dn),
            (CLIENT_SERIAL, self.serial),
            (CLIENT_FINGERPRINT, self.fingerprint),
        ];

        for (name, value) in pairs {
            let Some(value) = value else { continue };

            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(&value).unwrap(),
            );
        }

        headers
    }
}

/// Test client for making HTTP requests to the test server
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.try_get(path).await.unwrap()
    }

    /// Send a GET request to the given path, returning Result instead of panicking
    pub async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }

    /// Send a GET request carrying the given proxy certificate headers
    pub async fn get_as(&self, path: &str, headers: ProxyHeaders) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .headers(headers.into_header_map())
            .send()
            .await
            .unwrap()
    }

    /// Create a request with the given method and path
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Get the base URL of this test client
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    /// Configuration used by this test server
    pub config: Config,
    /// Holds the configuration file for the lifetime of the server
    _config_dir: tempfile::TempDir,
    /// Handle to the gateway server task
    _server_task_handle: tokio::task::JoinHandle<()>,
    /// Shutdown signal for the gateway server
    shutdown_signal: CancellationToken,
}

impl TestServer {
    /// Start a new test server with the given TOML configuration
    #[allow(clippy::panic)]
    pub async fn start(config_toml: &str) -> Self {
        // Go through the real loader so validation runs too
        let config_dir = tempfile::tempdir().unwrap();
        let config_path = config_dir.path().join("gateway.toml");
        std::fs::write(&config_path, config_toml).unwrap();

        let config = Config::load(&config_path).unwrap();

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let shutdown_signal = CancellationToken::new();

        let serve_config = ServeConfig {
            listen_address: address,
            config: config.clone(),
            shutdown_signal: shutdown_signal.clone(),
            log_filter: "server=debug,config=debug,integration_tests=debug".to_string(),
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();

        let server_task_handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        let client = TestClient::new(format!("http://{address}"));

        // Verify the server is actually running by making a simple request
        let mut last_error = None;

        for _ in 0..30 {
            if let Ok(Err(e)) = rx.try_recv() {
                panic!("Server failed to start: {e}");
            }

            match client.try_get("/health").await {
                Ok(_) => {
                    return TestServer {
                        client,
                        address,
                        config,
                        _config_dir: config_dir,
                        _server_task_handle: server_task_handle,
                        shutdown_signal,
                    };
                }
                Err(e) => last_error = Some(e),
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        match last_error {
            Some(e) => panic!("Server failed to become ready after 30 retries. Last error: {e}"),
            None => panic!("Server failed to become ready after 30 retries. No specific error."),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Graceful shutdown runs in the background, we cannot await it here
        self.shutdown_signal.cancel();
    }
}
