#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
    routing::post,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use character_forge::{
    AppState, CharacterFields, Config, GenerationError, ImageProvider, ProviderRequest,
};
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "sk-test";
pub const GENERATED_IMAGE: &str = "data:image/png;base64,R0VORVJBVEVE";

pub fn png_data_uri() -> String {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(b"\0\0\0\rIHDR\0\0\0\x01");
    format!("data:image/png;base64,{}", BASE64.encode(bytes))
}

pub fn nurse_fields() -> CharacterFields {
    CharacterFields::new("1800s", "Nurse", "apron, bonnet")
}

pub fn request_body(fields: &CharacterFields) -> Value {
    json!({ "fields": fields, "referenceImageBase64": png_data_uri() })
}

pub fn test_config() -> Config {
    Config::new().with_api_key(TEST_API_KEY)
}

/// Provider double that records every call and answers from a fixed script.
pub struct FakeProvider {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<(String, ProviderRequest)>>,
    reply: fn() -> Result<String, GenerationError>,
}

impl FakeProvider {
    pub fn new(reply: fn() -> Result<String, GenerationError>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply,
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::new(|| Ok(GENERATED_IMAGE.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for FakeProvider {
    async fn generate(
        &self,
        api_key: &str,
        request: ProviderRequest,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((api_key.to_string(), request));
        (self.reply)()
    }
}

pub fn build_test_app(config: Config, provider: Arc<FakeProvider>) -> Router {
    character_forge::router(AppState::new(config, provider))
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A stand-in for the image gateway, answering every call with `status` and `body`.
pub struct FakeGateway {
    pub url: String,
    pub calls: Arc<AtomicUsize>,
    pub last_request: Arc<Mutex<Option<(Option<String>, Value)>>>,
}

#[derive(Clone)]
struct GatewayState {
    status: StatusCode,
    body: Value,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(Option<String>, Value)>>>,
}

async fn gateway_handler(
    State(state): State<GatewayState>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_request.lock().unwrap() = Some((auth, payload));
    (state.status, Json(state.body.clone()))
}

impl FakeGateway {
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route("/v1/chat/completions", post(gateway_handler))
            .with_state(GatewayState {
                status,
                body,
                calls: calls.clone(),
                last_request: last_request.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/v1/chat/completions"),
            calls,
            last_request,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn gateway_image_reply(url: &str) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "Here is your character.",
                "images": [{ "type": "image_url", "image_url": { "url": url } }]
            }
        }]
    })
}

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn spawn_app(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
