#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use drinks_api::auth::TokenValidator;
use drinks_api::config::AppConfig;
use drinks_api::database::MemoryDrinkStore;
use drinks_api::AppState;
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

pub const ISSUER: &str = "https://coffee.test/";
pub const AUDIENCE: &str = "drinks";
pub const KID: &str = "drinks-test-key";

const JWKS: &str = include_str!("../fixtures/jwks.json");
const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/test_private_key.pem");

/// Barista role from the coffee shop: read details only
pub const BARISTA: &[&str] = &["get:drinks-detail"];

/// Manager role: everything
pub const MANAGER: &[&str] = &["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"];

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serves a fresh app on an unused port with an empty in-memory store
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let keys: JwkSet = serde_json::from_str(JWKS)?;
    let validator = TokenValidator::new(keys, ISSUER, AUDIENCE);
    let state = AppState::new(Arc::new(MemoryDrinkStore::new()), validator);

    let mut security = AppConfig::from_env().security;
    security.cors_origins.clear();
    let app = drinks_api::app(state, &security);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", base_url))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
    })
}

/// Signs `claims` with the fixture key, filling in any missing iss/aud/exp
pub fn sign_claims(mut claims: Value) -> String {
    let exp = Utc::now().timestamp() + 3600;
    if let Some(map) = claims.as_object_mut() {
        map.entry("iss").or_insert_with(|| json!(ISSUER));
        map.entry("aud").or_insert_with(|| json!(AUDIENCE));
        map.entry("exp").or_insert_with(|| json!(exp));
        map.entry("sub").or_insert_with(|| json!("auth0|tester"));
    }

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY).expect("fixture key");
    encode(&header, &claims, &key).expect("sign token")
}

/// Token carrying exactly `permissions`
pub fn token(permissions: &[&str]) -> String {
    sign_claims(json!({ "permissions": permissions }))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn water_recipe() -> Value {
    json!({"name": "water", "color": "blue", "parts": 1})
}

/// Creates a drink as a manager and returns its id
pub async fn create_drink(server: &TestServer, title: &str, recipe: Value) -> Result<i64> {
    let res = server
        .client
        .post(server.url("/drinks"))
        .header("Authorization", bearer(&token(MANAGER)))
        .json(&json!({ "title": title, "recipe": recipe }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == 200, "create failed with {}", res.status());

    let body = res.json::<Value>().await?;
    body["drinks"][0]["id"]
        .as_i64()
        .with_context(|| format!("no id in {}", body))
}
