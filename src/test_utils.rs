// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and list/watch sessions.

use crate::error::{HarnessError, Result};
use crate::kubernetes::source::{ChangeEvent, EventStream, Listing, ResourceClient};
use crate::selector::Selector;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

type Key = (String, String);

/// A mock HTTP service that returns queued responses based on request paths.
///
/// Each registration for a key is served once, in order, except the last one
/// which keeps being served. GET requests carrying `watch=true` are keyed under
/// the pseudo-method `WATCH`.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Key, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<Key>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, method: &str, path: &str, status: u16, body: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.push("GET", path, status, body.to_string())
    }

    /// Add a watch session: the given events, one per line, then end of stream
    pub fn on_watch(self, path: &str, events: &[String]) -> Self {
        let mut body = events.join("\n");
        body.push('\n');
        self.push("WATCH", path, 200, body)
    }

    /// Add a failing response for watch requests
    pub fn on_watch_status(self, path: &str, status: u16, body: &str) -> Self {
        self.push("WATCH", path, status, body.to_string())
    }

    /// Add a response for POST requests matching the path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.push("POST", path, status, body.to_string())
    }

    /// Add a response for DELETE requests matching the path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.push("DELETE", path, status, body.to_string())
    }

    /// Number of requests received for a method (or `WATCH`) and exact path
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "test")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        let key = match responses.get(&(method.to_string(), path.to_string())) {
            Some(_) => Some((method.to_string(), path.to_string())),
            None => responses
                .keys()
                .find(|(m, p)| m == method && path.starts_with(p.as_str()))
                .cloned(),
        }?;

        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let is_watch = req
            .uri()
            .query()
            .is_some_and(|q| q.split('&').any(|kv| kv == "watch=true"));
        let method = if is_watch {
            "WATCH".to_string()
        } else {
            req.method().to_string()
        };
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("path", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock pod JSON object in the given phase
pub fn pod_json(name: &str, phase: &str) -> serde_json::Value {
    pod_json_with_env(name, phase, &[])
}

/// Create a mock pod JSON object with one container carrying `env`
pub fn pod_json_with_env(name: &str, phase: &str, env: &[(&str, &str)]) -> serde_json::Value {
    let env: Vec<_> = env
        .iter()
        .map(|(k, v)| serde_json::json!({"name": k, "value": v}))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": "test",
            "uid": format!("uid-{}", name)
        },
        "spec": {
            "containers": [{"name": "mysql", "image": "mysql:8", "env": env}]
        },
        "status": {"phase": phase}
    })
}

/// Create a mock pod list JSON response
pub fn pod_list_json(resource_version: &str, pods: &[serde_json::Value]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": {"resourceVersion": resource_version},
        "items": pods
    })
    .to_string()
}

/// Create a single watch event line
pub fn watch_event_json(event_type: &str, object: &serde_json::Value) -> String {
    serde_json::json!({"type": event_type, "object": object}).to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Scripted response to a `list` call
pub enum ListStep<K> {
    Items(Vec<K>),
    Refused,
}

/// Scripted watch session
pub enum WatchStep<K> {
    /// Deliver the events, then close the stream
    Close(Vec<ChangeEvent<K>>),
    /// Deliver the events, then stay open without further events
    Hang(Vec<ChangeEvent<K>>),
    Refused,
}

/// In-memory `ResourceClient` replaying scripted list results and watch
/// sessions, counting calls and open subscriptions.
///
/// The last list step repeats once the script is exhausted; watches past the
/// end of the script hang.
pub struct ScriptedClient<K> {
    lists: Mutex<VecDeque<ListStep<K>>>,
    watches: Mutex<VecDeque<WatchStep<K>>>,
    list_calls: AtomicUsize,
    watch_calls: AtomicUsize,
    watch_versions: Mutex<Vec<String>>,
    open_watches: Arc<AtomicUsize>,
}

impl<K: Clone + Send + 'static> ScriptedClient<K> {
    pub fn new() -> Self {
        Self {
            lists: Mutex::new(VecDeque::new()),
            watches: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
            watch_versions: Mutex::new(Vec::new()),
            open_watches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn list(self, items: Vec<K>) -> Self {
        self.lists.lock().unwrap().push_back(ListStep::Items(items));
        self
    }

    pub fn list_refused(self) -> Self {
        self.lists.lock().unwrap().push_back(ListStep::Refused);
        self
    }

    pub fn watch_then_close(self, events: Vec<ChangeEvent<K>>) -> Self {
        self.watches.lock().unwrap().push_back(WatchStep::Close(events));
        self
    }

    pub fn watch_then_hang(self, events: Vec<ChangeEvent<K>>) -> Self {
        self.watches.lock().unwrap().push_back(WatchStep::Hang(events));
        self
    }

    pub fn watch_refused(self) -> Self {
        self.watches.lock().unwrap().push_back(WatchStep::Refused);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    /// Resource versions passed to each watch call
    pub fn watch_versions(&self) -> Vec<String> {
        self.watch_versions.lock().unwrap().clone()
    }

    /// Watch streams handed out and not yet dropped
    pub fn open_watches(&self) -> usize {
        self.open_watches.load(Ordering::SeqCst)
    }
}

impl<K: Clone + Send + 'static> Default for ScriptedClient<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn refused() -> HarnessError {
    HarnessError::IoError(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

struct WatchGuard(Arc<AtomicUsize>);

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<K: Clone + Send + Sync + 'static> ResourceClient<K> for ScriptedClient<K> {
    async fn list(&self, _selector: &Selector) -> Result<Listing<K>> {
        let n = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let step = {
            let mut lists = self.lists.lock().unwrap();
            if lists.len() > 1 {
                lists.pop_front()
            } else {
                lists.front().map(|s| match s {
                    ListStep::Items(items) => ListStep::Items(items.clone()),
                    ListStep::Refused => ListStep::Refused,
                })
            }
        };

        match step.unwrap_or(ListStep::Items(Vec::new())) {
            ListStep::Items(items) => Ok(Listing {
                items,
                resource_version: n.to_string(),
            }),
            ListStep::Refused => Err(refused()),
        }
    }

    async fn watch(&self, _selector: &Selector, resource_version: &str) -> Result<EventStream<K>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        self.watch_versions
            .lock()
            .unwrap()
            .push(resource_version.to_string());

        let step = self.watches.lock().unwrap().pop_front();
        let (events, hang) = match step {
            Some(WatchStep::Refused) => return Err(refused()),
            Some(WatchStep::Close(events)) => (events, false),
            Some(WatchStep::Hang(events)) => (events, true),
            None => (Vec::new(), true),
        };

        self.open_watches.fetch_add(1, Ordering::SeqCst);
        let guard = WatchGuard(self.open_watches.clone());

        let events = stream::iter(events);
        let stream = if hang {
            events.chain(stream::pending()).boxed()
        } else {
            events.boxed()
        };

        Ok(stream
            .map(move |event| {
                let _held = &guard;
                event
            })
            .boxed())
    }
}
