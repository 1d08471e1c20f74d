use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use upi_gateway::application::engine::VerificationEngine;
use upi_gateway::config::GatewayConfig;
use upi_gateway::domain::order::{OrderId, SettlementReport};
use upi_gateway::domain::ports::SettlementOracle;
use upi_gateway::error::Result as GatewayResult;
use upi_gateway::infrastructure::in_memory::InMemoryOrderStore;
use upi_gateway::infrastructure::webhook::WebhookDispatcher;
use upi_gateway::interfaces::http::routes;

/// Oracle fake that replays a script of settlement reports and counts how
/// often it is queried. An exhausted script keeps answering "not settled".
pub struct ScriptedOracle {
    reports: Mutex<VecDeque<GatewayResult<SettlementReport>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    pub fn new(reports: Vec<GatewayResult<SettlementReport>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reports: Mutex::new(reports.into()),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl SettlementOracle for ScriptedOracle {
    async fn query(&self, _order_id: &OrderId) -> GatewayResult<SettlementReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reports
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SettlementReport::NotSettled))
    }
}

/// A gateway instance listening on an ephemeral local port.
pub struct TestGateway {
    pub base_url: String,
    pub oracle_calls: Arc<AtomicUsize>,
    pub client: reqwest::Client,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Spawns a full gateway (in-memory store, scripted oracle, real webhook
/// dispatcher, axum API) and returns a handle for driving it over HTTP.
pub async fn spawn_gateway(
    config: GatewayConfig,
    reports: Vec<GatewayResult<SettlementReport>>,
) -> TestGateway {
    let store = InMemoryOrderStore::new();
    let (oracle, oracle_calls) = ScriptedOracle::new(reports);
    let (dispatcher, _worker) =
        WebhookDispatcher::start(&config).expect("webhook dispatcher must start");

    let engine = Arc::new(VerificationEngine::new(
        Box::new(store),
        Box::new(oracle),
        Box::new(dispatcher),
        &config,
    ));
    let app = routes::router(engine, config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test gateway");
    });

    TestGateway {
        base_url: format!("http://{addr}"),
        oracle_calls,
        client: reqwest::Client::new(),
    }
}

/// Spawns a stub merchant backend that records every webhook it receives.
/// Returns the callback URL and the stream of received payloads.
pub async fn spawn_merchant_stub() -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new()
        .route("/seller/webhook", post(receive_webhook))
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind merchant stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve merchant stub");
    });

    (format!("http://{addr}/seller/webhook"), rx)
}

async fn receive_webhook(
    State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let _ = tx.send(body);
    StatusCode::OK
}
