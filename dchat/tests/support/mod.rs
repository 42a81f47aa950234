#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dchat::prelude::*;
use dcommon::BoxFuture;
use dsession::{InMemorySessionSlot, SessionStore};
use dtransport::{
    HttpRequest, HttpResponse, HttpTransport, ResilientTransport, SecurityContext, Sleeper,
    StatusCode, TransportError,
};
use serde_json::{Value, json};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(StatusCode, Value),
    Fail(TransportError),
    /// Signals `arrived`, then answers once `release` is notified.
    Hold {
        arrived: Arc<Notify>,
        release: Arc<Notify>,
        status: StatusCode,
        body: Value,
    },
}

/// Fake server routed by `"METHOD /path"`. One-shot replies win over standing ones;
/// unrouted requests get a 404.
#[derive(Debug, Default)]
pub struct ScriptedServer {
    standing: Mutex<HashMap<String, Reply>>,
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, endpoint: &str, status: StatusCode, body: Value) -> &Self {
        self.standing
            .lock()
            .expect("standing lock")
            .insert(endpoint.to_string(), Reply::Respond(status, body));
        self
    }

    pub fn ok(&self, endpoint: &str, body: Value) -> &Self {
        self.on(endpoint, StatusCode::OK, body)
    }

    pub fn fail(&self, endpoint: &str, error: TransportError) -> &Self {
        self.standing
            .lock()
            .expect("standing lock")
            .insert(endpoint.to_string(), Reply::Fail(error));
        self
    }

    pub fn once(&self, endpoint: &str, reply: Reply) -> &Self {
        self.queued
            .lock()
            .expect("queued lock")
            .entry(endpoint.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|request| request.endpoint() == endpoint)
            .count()
    }

    pub fn last_body(&self, endpoint: &str) -> Option<Value> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .rev()
            .find(|request| request.endpoint() == endpoint)
            .and_then(|request| request.body.clone())
    }

    fn reply_for(&self, endpoint: &str) -> Reply {
        if let Some(reply) = self
            .queued
            .lock()
            .expect("queued lock")
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }

        self.standing
            .lock()
            .expect("standing lock")
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| Reply::Respond(StatusCode::NOT_FOUND, json!({"error": "no route"})))
    }
}

impl HttpTransport for ScriptedServer {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let endpoint = request.endpoint();
            self.requests.lock().expect("requests lock").push(request);

            match self.reply_for(&endpoint) {
                Reply::Respond(status, body) => Ok(HttpResponse::new(status, body.to_string())),
                Reply::Fail(error) => Err(error),
                Reply::Hold {
                    arrived,
                    release,
                    status,
                    body,
                } => {
                    arrived.notify_one();
                    release.notified().await;
                    Ok(HttpResponse::new(status, body.to_string()))
                }
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct InstantSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl Sleeper for InstantSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        self.delays.lock().expect("delays lock").push(delay);
        Box::pin(async {})
    }
}

pub struct Harness {
    pub server: Arc<ScriptedServer>,
    pub surface: Arc<RecordingSurface>,
    pub store: Arc<SessionStore>,
    pub sleeper: Arc<InstantSleeper>,
    pub controller: Arc<ChatController>,
}

impl Harness {
    pub fn new(server: Arc<ScriptedServer>) -> Self {
        Self::build(server, SessionStore::in_memory(), Arc::new(AlwaysConfirm))
    }

    pub fn with_persisted(server: Arc<ScriptedServer>, persisted: &str) -> Self {
        let store = SessionStore::new(Arc::new(InMemorySessionSlot::with_value(persisted)));
        Self::build(server, store, Arc::new(AlwaysConfirm))
    }

    pub fn with_confirm(server: Arc<ScriptedServer>, confirm: Arc<dyn Confirm>) -> Self {
        Self::build(server, SessionStore::in_memory(), confirm)
    }

    fn build(server: Arc<ScriptedServer>, store: SessionStore, confirm: Arc<dyn Confirm>) -> Self {
        let sleeper = Arc::new(InstantSleeper::default());
        let transport = ResilientTransport::new(server.clone()).with_sleeper(sleeper.clone());
        let api = Arc::new(DesignApi::new(transport, SecurityContext::new("csrf-test")));
        let store = Arc::new(store);
        let surface = Arc::new(RecordingSurface::new());
        let controller = Arc::new(ChatController::new(
            api,
            store.clone(),
            surface.clone(),
            confirm,
        ));

        Self {
            server,
            surface,
            store,
            sleeper,
            controller,
        }
    }
}

pub fn history(messages: Value) -> Value {
    json!({ "messages": messages })
}

pub fn sessions(entries: &[(&str, &str)]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|(id, name)| json!({"session_id": id, "name": name}))
            .collect(),
    )
}
