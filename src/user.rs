//! Profile management for the signed-in user

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{MessageResponse, UserProfile};
use crate::error::Result;
use crate::fetch::ApiClient;

/// Editable profile fields; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Image sent to `POST /user/upload-avatar`
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Client for the `/user` endpoints
#[derive(Clone)]
pub struct UserClient {
    api: ApiClient,
}

impl UserClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.api.get("/user/profile")?.execute().await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.api
            .put("/user/profile")?
            .json(update)?
            .execute()
            .await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse> {
        self.api
            .put("/user/change-password")?
            .json(request)?
            .execute()
            .await
    }

    /// Upload an avatar as a multipart form with a single `file` part
    pub async fn upload_avatar(&self, upload: AvatarUpload) -> Result<Value> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("file", part);

        self.api
            .post("/user/upload-avatar")?
            .multipart(form)
            .execute_value()
            .await
    }

    pub async fn activity(&self) -> Result<Value> {
        self.api.get("/user/activity")?.execute_value().await
    }
}
