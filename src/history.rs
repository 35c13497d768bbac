//! Purchase, transaction and YouTube history
//!
//! These endpoints are display-only aggregates and are returned as raw JSON.

use serde_json::Value;

use crate::error::Result;
use crate::fetch::ApiClient;

/// Client for the `/history` endpoints
#[derive(Clone)]
pub struct HistoryClient {
    api: ApiClient,
}

impl HistoryClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn purchases(&self) -> Result<Value> {
        self.api.get("/history/purchases")?.execute_value().await
    }

    pub async fn transactions(&self) -> Result<Value> {
        self.api.get("/history/transactions")?.execute_value().await
    }

    pub async fn youtube(&self) -> Result<Value> {
        self.api.get("/history/youtube")?.execute_value().await
    }
}
