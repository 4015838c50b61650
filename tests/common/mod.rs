//! Common test utilities for E2E tests

use mikromatter::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

const TEST_SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "test.example.com".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: TEST_SESSION_SECRET.to_string(),
                session_max_age: 604800,
                provider: config::OAuthProviderConfig {
                    name: "testprov".to_string(),
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                    authorize_url: "https://auth.test.example.com/authorize".to_string(),
                    token_url: "https://auth.test.example.com/token".to_string(),
                    userinfo_url: "https://auth.test.example.com/userinfo".to_string(),
                    scope: "openid email profile".to_string(),
                },
            },
            realtime: config::RealtimeConfig {
                channel_capacity: 64,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = mikromatter::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a test user in the database
    pub async fn create_test_user(&self, first_name: &str) -> mikromatter::data::User {
        use chrono::Utc;
        use mikromatter::data::User;

        let now = Utc::now();
        self.state
            .db
            .upsert_user(&User {
                id: format!("testprov:{}", first_name.to_lowercase()),
                email: Some(format!("{}@test.example.com", first_name.to_lowercase())),
                first_name: Some(first_name.to_string()),
                last_name: Some("Tester".to_string()),
                profile_image_url: None,
                bio: None,
                location: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    /// Create a signed session token for a user
    pub fn create_test_token(&self, user_id: &str) -> String {
        use mikromatter::auth::session::{Session, create_session_token};

        let session = Session::for_user(user_id, 604800);
        create_session_token(&session, TEST_SESSION_SECRET).unwrap()
    }

    /// Convenience: a user plus a bearer token for them
    pub async fn login_as(&self, first_name: &str) -> (mikromatter::data::User, String) {
        let user = self.create_test_user(first_name).await;
        let token = self.create_test_token(&user.id);
        (user, token)
    }
}
