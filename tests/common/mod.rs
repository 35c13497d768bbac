#![allow(dead_code)]

use std::sync::Arc;

use ottsonly_client::config::ClientOptions;
use ottsonly_client::store::{KeyValueStore, MemoryStore, ACCESS_TOKEN_KEY, USER_KEY};
use ottsonly_client::Ottsonly;
use serde_json::{json, Value};
use url::Url;
use wiremock::MockServer;

pub fn client_with_store(server: &MockServer) -> (Ottsonly, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let url = Url::parse(&server.uri()).unwrap();
    let client = Ottsonly::with_store(&url, ClientOptions::default(), store.clone()).unwrap();
    (client, store)
}

pub fn signed_in_client(server: &MockServer, token: &str) -> (Ottsonly, Arc<MemoryStore>) {
    let (client, store) = client_with_store(server);
    store.set_item(ACCESS_TOKEN_KEY, token).unwrap();
    (client, store)
}

pub fn cache_profile(store: &MemoryStore, profile: Value) {
    store.set_item(USER_KEY, &profile.to_string()).unwrap();
}

pub fn user_json(balance: f64) -> Value {
    json!({
        "id": "user_1",
        "name": "Asha",
        "email": "asha@example.com",
        "phone": "+919876543210",
        "role": "user",
        "wallet_balance": balance
    })
}
