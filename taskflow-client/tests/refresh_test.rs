/// Token refresh lifecycle tests
///
/// Runs the client against an in-process stub server that counts refresh
/// calls, verifying the single-flight contract: N concurrent 401s trigger
/// exactly one refresh POST, every request completes with the new token,
/// and a dead refresh token fails everything out after one attempt.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taskflow_client::client::ApiClient;
use taskflow_client::error::ClientError;
use taskflow_client::tokens::TokenPair;

/// Stub API state
struct StubState {
    /// Number of POST /auth/refresh calls received
    refresh_calls: AtomicUsize,

    /// Number of GET /tasks calls received
    task_calls: AtomicUsize,

    /// The access token the stub currently accepts
    valid_access: Mutex<String>,

    /// The refresh token the stub currently accepts
    valid_refresh: Mutex<String>,

    /// When set, GET /tasks answers 401 regardless of the token
    reject_all_tasks: AtomicBool,
}

async fn stub_list_tasks(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.task_calls.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Bearer {}", state.valid_access.lock().unwrap());
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if presented == expected && !state.reject_all_tasks.load(Ordering::SeqCst) {
        (StatusCode::OK, Json(json!({ "tasks": [], "total": 0 })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": "Token expired" })),
        )
    }
}

async fn stub_refresh(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let presented = body["refresh_token"].as_str().unwrap_or_default();
    let expected = state.valid_refresh.lock().unwrap().clone();

    if presented == expected {
        // Rotate: the old refresh token is dead from here on
        *state.valid_access.lock().unwrap() = "access-new".to_string();
        *state.valid_refresh.lock().unwrap() = "refresh-new".to_string();

        (
            StatusCode::OK,
            Json(json!({
                "user_id": "00000000-0000-0000-0000-000000000000",
                "access_token": "access-new",
                "refresh_token": "refresh-new"
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": "Refresh token revoked" })),
        )
    }
}

/// Spawns the stub server on a random port
async fn spawn_stub(valid_access: &str, valid_refresh: &str) -> (SocketAddr, Arc<StubState>) {
    let state = Arc::new(StubState {
        refresh_calls: AtomicUsize::new(0),
        task_calls: AtomicUsize::new(0),
        valid_access: Mutex::new(valid_access.to_string()),
        valid_refresh: Mutex::new(valid_refresh.to_string()),
        reject_all_tasks: AtomicBool::new(false),
    });

    let app = Router::new()
        .route("/tasks", get(stub_list_tasks))
        .route("/auth/refresh", post(stub_refresh))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn client_for(addr: SocketAddr, access: &str, refresh: &str) -> ApiClient {
    let client = ApiClient::new(format!("http://{}", addr));
    client.tokens().set(TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    });
    client
}

#[tokio::test]
async fn test_expired_token_refreshes_and_replays() {
    // Server accepts "access-new" only; client holds a stale token
    let (addr, state) = spawn_stub("access-new", "refresh-old").await;
    let client = client_for(addr, "access-stale", "refresh-old");

    let list = client.tasks().list(Default::default()).await.unwrap();
    assert_eq!(list.total, 0);

    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    // Original attempt + replay
    assert_eq!(state.task_calls.load(Ordering::SeqCst), 2);

    // The rotated pair is stored
    assert_eq!(
        client.tokens().access_token().as_deref(),
        Some("access-new")
    );
    assert_eq!(
        client.tokens().refresh_token().as_deref(),
        Some("refresh-new")
    );
}

#[tokio::test]
async fn test_concurrent_401s_trigger_exactly_one_refresh() {
    let (addr, state) = spawn_stub("access-new", "refresh-old").await;
    let client = client_for(addr, "access-stale", "refresh-old");

    const N: usize = 8;
    let mut handles = Vec::new();
    for _ in 0..N {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.tasks().list(Default::default()).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "request failed: {:?}", result.err());
    }

    // The core single-flight property
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.tokens().access_token().as_deref(),
        Some("access-new")
    );
}

#[tokio::test]
async fn test_dead_refresh_token_fails_everything_once() {
    // The server doesn't accept the client's refresh token at all
    let (addr, state) = spawn_stub("access-new", "refresh-that-the-client-does-not-have").await;
    let client = client_for(addr, "access-stale", "refresh-dead");

    const N: usize = 6;
    let mut handles = Vec::new();
    for _ in 0..N {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.tasks().list(Default::default()).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ClientError::SessionExpired)));
    }

    // One failed refresh, not N
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);

    // Tokens are cleared; the next call fails without any network traffic
    assert!(!client.tokens().is_authenticated());
    let result = client.tasks().list(Default::default()).await;
    assert!(matches!(result, Err(ClientError::NotAuthenticated)));
}

#[tokio::test]
async fn test_replay_happens_at_most_once() {
    // Refresh succeeds, but the replay still sees a 401
    let (addr, state) = spawn_stub("access-new", "refresh-old").await;
    state.reject_all_tasks.store(true, Ordering::SeqCst);

    let client = client_for(addr, "access-stale", "refresh-old");

    let result = client.tasks().list(Default::default()).await;

    // Terminal 401, not a retry loop
    match result {
        Err(ClientError::Api { status: 401, .. }) => {}
        other => panic!("expected terminal 401, got {:?}", other),
    }

    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.task_calls.load(Ordering::SeqCst), 2);
}
