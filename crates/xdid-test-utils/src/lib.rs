//! Local servers for xdid integration tests.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tokio::{net::TcpListener, sync::RwLock, time::sleep};
use tracing::{debug, error};
use url::Url;

/// Smallest and largest BEP44 wire records a relay accepts.
const RECORD_LEN: std::ops::RangeInclusive<usize> = 72..=1072;

type Records = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// In-memory Pkarr relay.
#[derive(Clone)]
pub struct StubRelay {
    pub url: Url,
    records: Records,
}

impl StubRelay {
    /// Starts a relay on a random open port.
    pub async fn spawn() -> Self {
        let records = Records::default();

        let router = Router::new()
            .route("/:id", get(get_record).put(put_record))
            .with_state(records.clone());

        let addr = serve(router, free_port()).await;
        let url = Url::parse(&format!("http://{addr}")).expect("valid url");

        Self { url, records }
    }

    /// Stores raw bytes, bypassing the size checks of the HTTP interface.
    pub async fn insert(&self, id: &str, bytes: Vec<u8>) {
        self.records.write().await.insert(id.to_string(), bytes);
    }

    pub async fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.records.read().await.get(id).cloned()
    }
}

async fn get_record(
    Path(id): Path<String>,
    State(records): State<Records>,
) -> Result<Vec<u8>, StatusCode> {
    records
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

async fn put_record(
    Path(id): Path<String>,
    State(records): State<Records>,
    body: Bytes,
) -> Result<(), (StatusCode, String)> {
    if !RECORD_LEN.contains(&body.len()) {
        debug!("Rejecting record of {} bytes", body.len());
        return Err((
            StatusCode::BAD_REQUEST,
            format!("invalid record length {}", body.len()),
        ));
    }

    records.write().await.insert(id, body.to_vec());
    Ok(())
}

/// Starts a relay that answers every request with the same status and body.
pub async fn spawn_fixed_relay(status: u16, body: Vec<u8>) -> Url {
    let status = StatusCode::from_u16(status).expect("valid status code");
    let router = Router::new().fallback(move || async move { (status, body) });

    let addr = serve(router, free_port()).await;
    Url::parse(&format!("http://{addr}")).expect("valid url")
}

/// Serves a DID document at `/.well-known/did.json` on a random open port,
/// returning the port. The document is built from the chosen port, as a
/// did:web for localhost includes it. Any other path responds with 404.
pub async fn serve_did_document(document: impl FnOnce(u16) -> String) -> u16 {
    let port = free_port();
    let document = document(port);

    let router = Router::new().route(
        "/.well-known/did.json",
        get(move || async move { document }),
    );

    serve(router, port).await;
    port
}

fn free_port() -> u16 {
    port_check::free_local_port().expect("Failed to find free port")
}

async fn serve(router: Router, port: u16) -> SocketAddr {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tokio::spawn(async move {
        let listener = TcpListener::bind(addr)
            .await
            .expect("Failed to bind port");

        if let Err(e) = axum::serve(listener, router).await {
            error!("Server error: {}", e);
        }
    });

    // Poll the port until it's open.
    while !port_check::is_port_reachable(addr) {
        sleep(Duration::from_millis(50)).await;
    }

    addr
}
