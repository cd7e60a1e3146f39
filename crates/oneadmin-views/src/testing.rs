//! Scripted gateway for page tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oneadmin_api::user::User;
use oneadmin_api::{ApiClient, ApiError, ApiRequest, Envelope, Method, Transport};
use oneadmin_core::types::UserRole;
use oneadmin_session::SharedStore;
use serde_json::Value;

use crate::context::Console;
use crate::notify::RecordingNotifier;

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Envelope>,
}

/// Answers by method and path. Queued replies are served in order and the
/// last one repeats. Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, path: &str, reply: Envelope) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub fn ok(&self, method: Method, path: &str, data: Value) -> &Self {
        self.on(method, path, Envelope::ok(data))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self) -> Option<ApiRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, req: ApiRequest) -> oneadmin_api::Result<Envelope> {
        self.requests.lock().unwrap().push(req.clone());
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| r.method == req.method && r.path == req.path)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("no route for {}", req),
            })?;
        let reply = if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        };
        reply.ok_or_else(|| ApiError::Decode("empty route".to_string()))
    }
}

pub struct Harness {
    pub console: Console,
    pub mock: Arc<MockTransport>,
    pub notes: Arc<RecordingNotifier>,
}

pub fn harness() -> Harness {
    let mock = MockTransport::new();
    let notes = Arc::new(RecordingNotifier::new());
    let console = Console::new(
        ApiClient::new(mock.clone()),
        SharedStore::in_memory(),
        notes.clone(),
    )
    .with_origin("https://console.example.com");
    Harness {
        console,
        mock,
        notes,
    }
}

impl Harness {
    pub fn login_as(&self, role: UserRole) -> User {
        let user = User {
            id: 1,
            username: "root".into(),
            display_name: "Root".into(),
            role,
            quota: 1_000_000,
            ..Default::default()
        };
        self.console.auth.login(user.clone()).unwrap();
        user
    }
}
