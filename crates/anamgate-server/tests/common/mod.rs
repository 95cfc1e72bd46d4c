//! Shared test helpers: a scripted portal double and a server harness.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use anamgate_core::{CodeDivision, Credentials};
use anamgate_server::{AppConfig, build_app};
use anamgate_upstream::{CareKind, PortalConnector, PortalError, PortalSession};

pub const TEST_SECRET: &str = "integration-test-signing-key";

/// Everything the double observed, shared between connector and sessions.
#[derive(Default)]
pub struct Recorder {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    calls: Mutex<Vec<Value>>,
}

impl Recorder {
    fn record(&self, call: Value) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Scripted portal double. Records every connect, query and close so tests
/// can assert exactly what reached the portal.
pub struct MockPortal {
    reject_sign_in: Option<String>,
    fail_queries: Option<String>,
    payload: Value,
    recorder: Arc<Recorder>,
}

impl MockPortal {
    /// Accepts every sign-in; queries return an empty list.
    pub fn accepting() -> Arc<Self> {
        Self::with_payload(json!([]))
    }

    /// Accepts every sign-in; queries return `payload`.
    pub fn with_payload(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            reject_sign_in: None,
            fail_queries: None,
            payload,
            recorder: Arc::default(),
        })
    }

    /// Rejects every sign-in with the given message.
    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reject_sign_in: Some(message.to_string()),
            fail_queries: None,
            payload: Value::Null,
            recorder: Arc::default(),
        })
    }

    /// Accepts sign-ins but fails every query with the given message.
    pub fn failing_queries(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reject_sign_in: None,
            fail_queries: Some(message.to_string()),
            payload: Value::Null,
            recorder: Arc::default(),
        })
    }

    pub fn connects(&self) -> usize {
        self.recorder.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.recorder.closes.load(Ordering::SeqCst)
    }

    /// Recorded query calls (connects excluded).
    pub fn calls(&self) -> Vec<Value> {
        self.recorder
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c["op"] != "connect")
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PortalConnector for MockPortal {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn PortalSession>, PortalError> {
        self.recorder.connects.fetch_add(1, Ordering::SeqCst);
        self.recorder
            .record(json!({"op": "connect", "identifier": credentials.identifier}));

        if let Some(message) = &self.reject_sign_in {
            return Err(PortalError::sign_in(message.clone()));
        }

        Ok(Box::new(MockSession {
            fail_queries: self.fail_queries.clone(),
            payload: self.payload.clone(),
            recorder: self.recorder.clone(),
        }))
    }
}

struct MockSession {
    fail_queries: Option<String>,
    payload: Value,
    recorder: Arc<Recorder>,
}

impl MockSession {
    fn answer(&self, call: Value) -> Result<Value, PortalError> {
        self.recorder.record(call);
        match &self.fail_queries {
            Some(message) => Err(PortalError::portal(message.clone())),
            None => Ok(self.payload.clone()),
        }
    }
}

#[async_trait]
impl PortalSession for MockSession {
    async fn member_info(&self) -> Result<Value, PortalError> {
        self.answer(json!({"op": "member_info"}))
    }

    async fn reservations(
        &self,
        facility: &str,
        from: u32,
        to: u32,
    ) -> Result<Value, PortalError> {
        self.answer(json!({"op": "reservations", "facility": facility, "from": from, "to": to}))
    }

    async fn lab_results(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError> {
        self.answer(json!({"op": "lab_results", "facility": facility, "from": from, "to": to}))
    }

    async fn medications(&self, facility: &str, from: u32, to: u32) -> Result<Value, PortalError> {
        self.answer(json!({"op": "medications", "facility": facility, "from": from, "to": to}))
    }

    async fn care_history(
        &self,
        facility: &str,
        from: u32,
        to: u32,
        kind: CareKind,
    ) -> Result<Value, PortalError> {
        self.answer(json!({
            "op": "care_history",
            "facility": facility,
            "from": from,
            "to": to,
            "kind": kind.discriminator(),
        }))
    }

    async fn paid_list(
        &self,
        facility: &str,
        from: u32,
        to: u32,
        division: CodeDivision,
    ) -> Result<Value, PortalError> {
        self.answer(json!({
            "op": "paid_list",
            "facility": facility,
            "from": from,
            "to": to,
            "division": division.as_code(),
        }))
    }

    async fn paid_detail(&self, facility: &str, payment_number: i64) -> Result<Value, PortalError> {
        self.answer(json!({
            "op": "paid_detail",
            "facility": facility,
            "payment_number": payment_number,
        }))
    }

    async fn close(self: Box<Self>) {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test configuration with a fixed signing key.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.secret_key = TEST_SECRET.into();
    cfg
}

/// Starts the gateway on an ephemeral port against the given portal double.
pub async fn start_server(
    portal: Arc<MockPortal>,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&test_config(), portal);

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}
