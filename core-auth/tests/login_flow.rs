//! End-to-end login flow tests over mock bridges.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus};
use bridge_traits::storage::SecureStore;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

use core_api::{ApiClient, ApiClientConfig, ApiError, DEFAULT_BASE_URL};
use core_auth::{
    AuthError, AuthManager, AuthState, CredentialCache, DEFAULT_ACCOUNT_EMAIL,
    DEFAULT_ACCOUNT_PASSWORD,
};
use core_runtime::events::EventBus;

struct ScriptedTransport {
    responses: Mutex<VecDeque<BridgeResult<HttpResponse>>>,
    requests: StdMutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<BridgeResult<HttpResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: StdMutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl HttpClient for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(BridgeError::ConnectionFailed("exhausted".to_string())))
    }
}

#[derive(Default)]
struct MemorySecureStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

struct SwitchableMonitor {
    connected: AtomicBool,
}

impl SwitchableMonitor {
    fn new(connected: bool) -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(connected),
        })
    }

    fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetworkMonitor for SwitchableMonitor {
    async fn network_info(&self) -> BridgeResult<NetworkInfo> {
        Ok(NetworkInfo {
            status: if self.connected.load(Ordering::SeqCst) {
                NetworkStatus::Connected
            } else {
                NetworkStatus::Disconnected
            },
            is_metered: false,
        })
    }

    async fn subscribe_changes(&self) -> BridgeResult<Box<dyn NetworkChangeStream>> {
        unimplemented!("not exercised")
    }
}

fn ok(status: u16, body: &str) -> BridgeResult<HttpResponse> {
    Ok(HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    })
}

const LOGIN_OK: &str = r#"{
    "_id": "663d2e", "name": "Ada", "email": "ada@leafguard.com",
    "role": "Farmer", "isSubscribed": false, "remainingFreeScans": 3,
    "token": "jwt-token"
}"#;

struct World {
    manager: AuthManager,
    api: Arc<ApiClient>,
    cache: Arc<CredentialCache>,
    transport: Arc<ScriptedTransport>,
    monitor: Arc<SwitchableMonitor>,
}

fn world(
    store: Arc<MemorySecureStore>,
    transport: Arc<ScriptedTransport>,
    connected: bool,
) -> World {
    let cache = Arc::new(CredentialCache::new(store));
    let api = Arc::new(
        ApiClient::new(
            transport.clone(),
            cache.clone(),
            ApiClientConfig {
                retry_delay: Duration::from_millis(1),
                ..Default::default()
            },
        )
        .unwrap(),
    );
    let monitor = SwitchableMonitor::new(connected);
    let manager = AuthManager::new(
        api.clone(),
        cache.clone(),
        monitor.clone(),
        EventBus::new(100),
    );
    World {
        manager,
        api,
        cache,
        transport,
        monitor,
    }
}

#[tokio::test]
async fn default_login_with_no_prior_state() {
    let w = world(
        Arc::new(MemorySecureStore::default()),
        ScriptedTransport::new(vec![]),
        false,
    );

    let session = w
        .manager
        .login(DEFAULT_ACCOUNT_EMAIL, DEFAULT_ACCOUNT_PASSWORD)
        .await
        .unwrap();

    assert!(session.is_offline());
    assert_eq!(session.profile.remaining_free_scans, 3);
    assert!(!session.profile.is_subscribed);
    assert_eq!(w.manager.state().await, AuthState::SignedInOffline);
    assert_eq!(w.transport.call_count(), 0);
}

#[tokio::test]
async fn full_online_then_offline_relogin_cycle() {
    let store = Arc::new(MemorySecureStore::default());
    let w = world(
        store,
        ScriptedTransport::new(vec![ok(200, LOGIN_OK)]),
        true,
    );

    // Online login persists everything.
    let online = w.manager.login("ada@leafguard.com", "secret123").await.unwrap();
    assert!(!online.is_offline());
    assert_eq!(w.transport.call_count(), 1);

    // Logout keeps the remembered pair.
    w.manager.logout().await.unwrap();
    assert!(w.cache.token().await.unwrap().is_none());

    // Logout cleared the cached profile, so the remembered pair alone
    // cannot rebuild a session offline.
    w.monitor.set_connected(false);
    let err = w
        .manager
        .login("ada@leafguard.com", "secret123")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NoConnectivity));
}

#[tokio::test]
async fn offline_relogin_without_logout() {
    let store = Arc::new(MemorySecureStore::default());
    let w = world(
        store,
        ScriptedTransport::new(vec![ok(200, LOGIN_OK)]),
        true,
    );

    w.manager.login("ada@leafguard.com", "secret123").await.unwrap();

    // App relaunch without logout: cache still holds profile + pair.
    w.monitor.set_connected(false);
    let session = w.manager.login("ada@leafguard.com", "secret123").await.unwrap();

    assert!(session.is_offline());
    assert_eq!(session.profile.id, "663d2e");
    assert_eq!(w.transport.call_count(), 1);
}

#[tokio::test]
async fn detection_denied_does_not_touch_local_scan_count() {
    let w = world(
        Arc::new(MemorySecureStore::default()),
        ScriptedTransport::new(vec![
            ok(200, LOGIN_OK),
            ok(
                403,
                r#"{"message":"You have used all your free scans. Please subscribe to continue.","remainingScans":0}"#,
            ),
        ]),
        true,
    );

    w.manager.login("ada@leafguard.com", "secret123").await.unwrap();

    let err = w
        .api
        .detect_disease(Bytes::from_static(b"jpegdata"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::InsufficientScans);

    // The caller never got a result, so the orchestrator was never told to
    // update the count.
    let session = w.manager.current_session().await.unwrap();
    assert_eq!(session.profile.remaining_free_scans, 3);
}

#[tokio::test]
async fn successful_detection_flows_into_scan_count() {
    let w = world(
        Arc::new(MemorySecureStore::default()),
        ScriptedTransport::new(vec![
            ok(200, LOGIN_OK),
            ok(
                200,
                r#"{"success":true,"data":{
                    "disease":"Leaf Spot","confidence":0.95,
                    "description":"Fungal infection",
                    "symptoms":["Brown spots"],
                    "recommendations":["Remove affected leaves"],
                    "preventions":["Avoid overhead watering"],
                    "imageUrl":"/uploads/p.jpg","remainingScans":2}}"#,
            ),
        ]),
        true,
    );

    w.manager.login("ada@leafguard.com", "secret123").await.unwrap();

    let detection = w
        .api
        .detect_disease(Bytes::from_static(b"jpegdata"))
        .await
        .unwrap();
    assert_eq!(detection.remaining_scans, 2);

    let profile = w
        .manager
        .update_remaining_scans(detection.remaining_scans)
        .await
        .unwrap();
    assert_eq!(profile.remaining_free_scans, 2);

    let stored = w.cache.stored_profile().await.unwrap().unwrap();
    assert_eq!(stored.remaining_free_scans, 2);
}

#[tokio::test]
async fn any_endpoint_401_clears_the_cached_token() {
    let w = world(
        Arc::new(MemorySecureStore::default()),
        ScriptedTransport::new(vec![
            ok(200, LOGIN_OK),
            ok(401, r#"{"message":"Not authorized, token failed"}"#),
        ]),
        true,
    );

    w.manager.login("ada@leafguard.com", "secret123").await.unwrap();
    assert!(w.cache.token().await.unwrap().is_some());

    let err = w.api.recent_scans().await.unwrap_err();
    assert_eq!(err, ApiError::SessionExpired);

    assert!(w.cache.token().await.unwrap().is_none());
}

#[tokio::test]
async fn base_url_update_and_reset_route_subsequent_calls() {
    let w = world(
        Arc::new(MemorySecureStore::default()),
        ScriptedTransport::new(vec![
            ok(200, r#"{"status":"ok"}"#),
            ok(200, r#"{"status":"ok"}"#),
        ]),
        true,
    );

    w.api.update_base_url("https://staging.leafguard.example/api").unwrap();
    w.api.health_check().await;

    w.api.reset_base_url();
    w.api.health_check().await;

    let urls = w.transport.urls();
    assert_eq!(urls[0], "https://staging.leafguard.example/api/health");
    assert_eq!(urls[1], format!("{}{}", DEFAULT_BASE_URL, "/health"));
}

#[tokio::test]
async fn session_restore_then_expiry() {
    let store = Arc::new(MemorySecureStore::default());
    {
        let w = world(
            store.clone(),
            ScriptedTransport::new(vec![ok(200, LOGIN_OK)]),
            true,
        );
        w.manager.login("ada@leafguard.com", "secret123").await.unwrap();
    }

    // Relaunch: restore without network, then the server rejects the old
    // token on first use.
    let w = world(
        store,
        ScriptedTransport::new(vec![ok(401, r#"{"message":"Not authorized"}"#)]),
        true,
    );

    let restored = w.manager.restore().await.unwrap().unwrap();
    assert_eq!(restored.profile.email, "ada@leafguard.com");

    let err = w.api.user_profile().await.unwrap_err();
    assert_eq!(err, ApiError::SessionExpired);
    assert!(w.cache.token().await.unwrap().is_none());
}
