//! YouTube family-invite requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::fetch::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YoutubeRequestStatus {
    Pending,
    Done,
    #[serde(other)]
    Other,
}

/// Body of `POST /youtube/request` and `PUT /youtube/request/edit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeRequestForm {
    pub subscription_id: String,
    pub youtube_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub youtube_email: Option<String>,
    pub status: YoutubeRequestStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub request_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Client for the `/youtube` endpoints
#[derive(Clone)]
pub struct YoutubeClient {
    api: ApiClient,
}

impl YoutubeClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn submit_request(&self, form: &YoutubeRequestForm) -> Result<Value> {
        self.api
            .post("/youtube/request")?
            .json(form)?
            .execute_value()
            .await
    }

    pub async fn request_status(&self) -> Result<Value> {
        self.api.get("/youtube/request/status")?.execute_value().await
    }

    pub async fn request_for_subscription(&self, subscription_id: &str) -> Result<YoutubeRequest> {
        self.api
            .get("/youtube/request/subscription")?
            .segment(subscription_id)
            .execute()
            .await
    }

    pub async fn edit_request(&self, form: &YoutubeRequestForm) -> Result<Value> {
        self.api
            .put("/youtube/request/edit")?
            .json(form)?
            .execute_value()
            .await
    }
}
