//! End-to-end page flows against a scripted gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oneadmin_api::{ApiClient, ApiError, ApiRequest, Envelope, Method, Transport};
use oneadmin_session::{LocalStore, SharedStore, StoreKey};
use oneadmin_views::auth::AuthPages;
use oneadmin_views::channels::ChannelsTable;
use oneadmin_views::edit_channel::ChannelEditor;
use oneadmin_views::{Console, Level, RecordingNotifier, Route};
use serde_json::{json, Value};

/// One fixed reply per route.
#[derive(Default)]
struct Gateway {
    replies: Mutex<HashMap<(String, String), Envelope>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl Gateway {
    fn reply(&self, method: Method, path: &str, data: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), Envelope::ok(data));
    }

    fn hits(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for Gateway {
    async fn send(&self, req: ApiRequest) -> oneadmin_api::Result<Envelope> {
        self.log.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .get(&(req.method.to_string(), req.path.clone()))
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                body: req.path,
            })
    }
}

fn console(gateway: &Arc<Gateway>, store: SharedStore) -> (Console, Arc<RecordingNotifier>) {
    let notes = Arc::new(RecordingNotifier::new());
    let console = Console::new(ApiClient::new(gateway.clone()), store, notes.clone());
    (console, notes)
}

fn channels(ids: std::ops::Range<i64>) -> Value {
    Value::Array(
        ids.map(|id| json!({"id": id, "name": format!("ch{}", id), "type": 1, "status": 1}))
            .collect(),
    )
}

#[tokio::test]
async fn login_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let gateway = Arc::new(Gateway::default());
    gateway.reply(
        Method::Post,
        "/api/user/login",
        json!({"id": 1, "username": "admin", "role": 10, "status": 1}),
    );

    let (first, _) = console(&gateway, SharedStore::new(LocalStore::open(&path)));
    let route = AuthPages::new(first).login("admin", "s3cret-pass", None).await.unwrap();
    assert_eq!(route, Route::Token);

    let (second, _) = console(&gateway, SharedStore::new(LocalStore::open(&path)));
    let user = second.auth.current().unwrap();
    assert_eq!(user.username, "admin");
    assert!(second.auth.is_admin());
    assert!(second.store.get(StoreKey::User).is_some());
}

#[tokio::test]
async fn channel_create_refreshes_list_and_closes() {
    let gateway = Arc::new(Gateway::default());
    gateway.reply(Method::Get, "/api/channel/", channels(1..4));
    gateway.reply(Method::Get, "/api/group/", json!(["default"]));
    gateway.reply(Method::Post, "/api/channel/", Value::Null);
    let (ctx, notes) = console(&gateway, SharedStore::in_memory());

    let mut list = ChannelsTable::new(ctx.clone());
    list.open().await.unwrap();
    assert_eq!(gateway.hits(Method::Get, "/api/channel/"), 1);

    let mut editor = ChannelEditor::create(ctx);
    editor.draft_mut().name = "new".into();
    editor.draft_mut().key = "sk-new".into();
    editor.set_type(14);
    editor.submit(&mut list).await.unwrap();

    assert!(!editor.is_open());
    assert_eq!(gateway.hits(Method::Post, "/api/channel/"), 1);
    assert_eq!(gateway.hits(Method::Get, "/api/channel/"), 2);
    assert!(notes.contains(Level::Success, "Channel created successfully!"));
}

#[tokio::test]
async fn invalid_forms_never_reach_the_gateway() {
    let gateway = Arc::new(Gateway::default());
    let (ctx, notes) = console(&gateway, SharedStore::in_memory());
    let mut list = ChannelsTable::new(ctx.clone());

    let mut editor = ChannelEditor::create(ctx.clone());
    assert!(editor.submit(&mut list).await.is_err());
    assert!(editor.is_open());

    let pages = AuthPages::new(ctx);
    assert!(pages.login("", "", None).await.is_err());

    assert_eq!(gateway.total(), 0);
    assert!(notes
        .messages()
        .iter()
        .all(|(level, _)| *level == Level::Info));
}

#[tokio::test]
async fn paging_past_cache_fetches_once() {
    let gateway = Arc::new(Gateway::default());
    gateway.reply(Method::Get, "/api/channel/", channels(1..11));
    gateway.reply(Method::Get, "/api/group/", json!([]));
    let (ctx, _) = console(&gateway, SharedStore::in_memory());

    let mut list = ChannelsTable::new(ctx);
    list.open().await.unwrap();
    list.set_page(2).await.unwrap();
    list.set_page(1).await.unwrap();
    list.set_page(2).await.unwrap();
    assert_eq!(gateway.hits(Method::Get, "/api/channel/"), 2);
    assert_eq!(list.table().len(), 20);
}
