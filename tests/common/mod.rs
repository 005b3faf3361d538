use reqwest::Client;
use sea_orm::{ConnectOptions, Database};
use serde_json::json;
use std::sync::Arc;

use electrostore::api::create_api_router;
use electrostore::entities::{seed_admin, setup_schema};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Secret15";

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

/// Boots the full router over a fresh in-memory store on an ephemeral port
/// and seeds the admin account, so every test file talks to its own server.
pub async fn spawn_app() -> TestApp {
    std::env::set_var("SECRET", "integration-test-secret");

    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1);
    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory store");
    setup_schema(&db).await;
    seed_admin(&db, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let app = create_api_router(Arc::new(db));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!("http://{}", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    TestApp {
        address,
        client: Client::new(),
    }
}

impl TestApp {
    /// POST /api/users; panics on anything but 201.
    pub async fn register(&self, username: &str, password: &str, role: &str) {
        let response = self
            .client
            .post(format!("{}/api/users", self.address))
            .json(&json!({
                "username": username,
                "name": "Test",
                "surname": "Account",
                "password": password,
                "role": role,
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    /// POST /api/sessions; returns the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/sessions", self.address))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse login response JSON");
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_owned()
    }

    pub async fn register_and_login(&self, username: &str, password: &str, role: &str) -> String {
        self.register(username, password, role).await;
        self.login(username, password).await
    }

    /// Registers a product through a freshly logged-in manager.
    pub async fn seed_product(&self, token: &str, model: &str, quantity: i32, price: f32) {
        let response = self
            .client
            .post(format!("{}/api/products", self.address))
            .bearer_auth(token)
            .json(&json!({
                "model": model,
                "category": "Smartphone",
                "quantity": quantity,
                "selling_price": price,
            }))
            .send()
            .await
            .expect("Failed to send register product request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }
}
