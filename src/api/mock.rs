//! Scripted [`ApiClient`] for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

use super::{ApiClient, ClientError, Result, Verb};
use crate::storage::TokenStore;

type Route = (Verb, String);

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub verb: Verb,
    pub path: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

#[derive(Default)]
struct Script {
    sticky: HashMap<Route, Result<Value>>,
    queued: HashMap<Route, VecDeque<Result<Value>>>,
    gates: HashMap<Route, Arc<Notify>>,
    calls: Vec<RecordedCall>,
}

/// Replays canned responses per `(verb, path)`.
///
/// Queued responses are consumed first, then the sticky one; an unscripted
/// route answers 404.
#[derive(Default)]
pub struct MockApi {
    script: Mutex<Script>,
    tokens: Option<Arc<dyn TokenStore>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bearer token each call would have carried.
    pub fn with_tokens(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            script: Mutex::default(),
            tokens: Some(tokens),
        }
    }

    pub fn respond(&self, verb: Verb, path: &str, response: Result<Value>) -> &Self {
        self.script
            .lock()
            .sticky
            .insert((verb, path.to_string()), response);
        self
    }

    pub fn respond_once(&self, verb: Verb, path: &str, response: Result<Value>) -> &Self {
        self.script
            .lock()
            .queued
            .entry((verb, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// Make calls to this route wait until the returned handle is notified.
    pub fn hold(&self, verb: Verb, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script
            .lock()
            .gates
            .insert((verb, path.to_string()), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    pub fn count(&self, verb: Verb, path: &str) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.verb == verb && c.path == path)
            .count()
    }

    pub fn last_body(&self, verb: Verb, path: &str) -> Option<Value> {
        self.script
            .lock()
            .calls
            .iter()
            .rev()
            .find(|c| c.verb == verb && c.path == path)
            .and_then(|c| c.body.clone())
    }

    pub fn writes(&self) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.verb != Verb::Get)
            .count()
    }
}

pub fn rejected(status: u16, message: &str) -> Result<Value> {
    Err(ClientError::Rejected {
        status,
        message: message.to_string(),
    })
}

fn clone_result(result: &Result<Value>) -> Result<Value> {
    match result {
        Ok(v) => Ok(v.clone()),
        Err(ClientError::Rejected { status, message }) => Err(ClientError::Rejected {
            status: *status,
            message: message.clone(),
        }),
        Err(other) => Err(ClientError::Transport(other.to_string())),
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn request(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value> {
        let route = (verb, path.to_string());
        let gate = {
            let mut script = self.script.lock();
            script.calls.push(RecordedCall {
                verb,
                path: path.to_string(),
                body,
                bearer: self.tokens.as_ref().and_then(|t| t.token()),
            });
            script.gates.get(&route).cloned()
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut script = self.script.lock();
        if let Some(next) = script.queued.get_mut(&route).and_then(|q| q.pop_front()) {
            return next;
        }
        match script.sticky.get(&route) {
            Some(result) => clone_result(result),
            None => Err(ClientError::Rejected {
                status: 404,
                message: format!("No route {} {}", verb, path),
            }),
        }
    }
}
