//! In-process mock gateway for scenario tests

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gateway_probe::runner::events::{render_event, EventEmitter};
use gateway_probe::runner::execute;
use gateway_probe::runner::state::RunState;
use gateway_probe::ProbeConfig;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct GatewayState {
    routes: Arc<HashMap<String, (u16, String)>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Canned responses keyed by path; unknown paths answer 404
#[derive(Default)]
pub struct MockGateway {
    routes: HashMap<String, (u16, String)>,
}

pub struct RunningGateway {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RunningGateway {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// The gateway from the end-to-end happy path
    pub fn healthy() -> Self {
        Self::new()
            .route("/health", 200, r#"{"status":"ok"}"#)
            .route("/api/customers/login", 200, r#"{"token":"abc123"}"#)
            .route("/api/loans/count", 200, r#"{"count":5}"#)
            .route("/api/transactions/count", 200, r#"{"count":12}"#)
    }

    pub async fn spawn(self) -> RunningGateway {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = GatewayState {
            routes: Arc::new(self.routes),
            requests: requests.clone(),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningGateway {
            base_url: format!("http://{}", addr),
            requests,
        }
    }
}

async fn handle(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    match state.routes.get(uri.path()) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, "not found".to_string()),
    }
}

/// URL of a port nothing listens on
pub async fn refused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Run the probes and return the finished run with its rendered console output
pub async fn run_against(config: &ProbeConfig) -> (RunState, String) {
    let (emitter, mut receiver) = EventEmitter::new();
    let run = execute(config, "scenario", emitter).await.unwrap();

    colored::control::set_override(false);
    let mut out = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        render_event(&event, &mut out).unwrap();
    }
    (run, String::from_utf8(out).unwrap())
}
