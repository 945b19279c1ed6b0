#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use finbot_ai::{AiError, ChatCompletionClient, CompletionOutput, CompletionRequest};
use finbot_server::{api::app_router, build_state_with_client, config::Config, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Completion client that answers every request with the same text.
#[derive(Default)]
pub struct CannedClient {
    pub requests: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl ChatCompletionClient for CannedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, AiError> {
        let is_title = request.params.max_tokens <= 20;
        self.requests.lock().unwrap().push(request);
        Ok(CompletionOutput {
            content: Some(if is_title {
                "Rencana Dana Darurat".to_string()
            } else {
                "Sisihkan 20% dari gaji Anda.".to_string()
            }),
            tokens_used: 64,
        })
    }
}

pub struct TestApp {
    // Keeps the database alive for the router's lifetime.
    _dir: TempDir,
    pub router: Router,
    pub client: Arc<CannedClient>,
    pub state: Arc<AppState>,
}

pub async fn spawn_app(overrides: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut vars: HashMap<String, String> = HashMap::from([
        (
            "FB_DB_PATH".to_string(),
            dir.path().join("test.db").to_string_lossy().to_string(),
        ),
        (
            "FB_JWT_SECRET".to_string(),
            "finbot-local-dev-secret-32-bytes".to_string(),
        ),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

    let client = Arc::new(CannedClient::default());
    let state = build_state_with_client(&config, client.clone()).await.unwrap();
    TestApp {
        _dir: dir,
        router: app_router(state.clone(), &config),
        client,
        state,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Registers a user and returns a bearer token for them.
    pub async fn login_as(&self, email: &str) -> String {
        let register = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "name": "Budi",
                    "email": email,
                    "password": "rahasia123",
                })),
            )
            .await;
        assert_eq!(register.status(), 201);

        let login = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": "rahasia123" })),
            )
            .await;
        assert_eq!(login.status(), 200);
        json(login).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub async fn json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
