//! Authentication and session lifecycle

pub mod session;
pub mod types;

use log::info;
use serde_json::json;

use crate::error::{Error, Result};
use crate::fetch::ApiClient;

pub use session::*;
pub use types::*;

/// Client for the `/auth` endpoints
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Register a new account. The returned session is persisted before this
    /// returns.
    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse> {
        let response = self
            .api
            .post("/auth/register")?
            .json(request)?
            .execute::<TokenResponse>()
            .await?;

        self.api.sessions().persist_login(&response)?;
        info!("Registered and signed in as {}", response.user.id);
        Ok(response)
    }

    /// Sign in with email and password. The returned session is persisted
    /// before this returns.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .api
            .post("/auth/user/login")?
            .json(&request)?
            .execute::<TokenResponse>()
            .await?;

        self.api.sessions().persist_login(&response)?;
        info!("Signed in as {}", response.user.id);
        Ok(response)
    }

    /// Complete a phone OTP login
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<TokenResponse> {
        let request = VerifyOtpRequest {
            phone: phone.to_string(),
            otp: otp.to_string(),
        };

        let response = self
            .api
            .post("/auth/verify")?
            .json(&request)?
            .execute::<TokenResponse>()
            .await?;

        self.api.sessions().persist_login(&response)?;
        Ok(response)
    }

    /// `POST /auth/logout`. Does not touch local state; see
    /// [`crate::Ottsonly::logout`] for clearing the session.
    pub async fn logout(&self) -> Result<MessageResponse> {
        self.api
            .post("/auth/logout")?
            .execute::<MessageResponse>()
            .await
    }

    /// Current user as reported by `GET /auth/me`
    pub async fn me(&self) -> Result<UserProfile> {
        self.api.get("/auth/me")?.execute::<UserProfile>().await
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    ///
    /// Never called implicitly: a 401 elsewhere is surfaced to the caller.
    pub async fn refresh_token(&self) -> Result<RefreshResponse> {
        let refresh_token = self
            .api
            .sessions()
            .refresh_token()?
            .ok_or_else(|| Error::config("no refresh token stored"))?;

        let response = self
            .api
            .post("/auth/refresh-token")?
            .json(&json!({ "refresh_token": refresh_token }))?
            .execute::<RefreshResponse>()
            .await?;

        self.api
            .sessions()
            .persist_tokens(&response.access_token, response.refresh_token.as_deref())?;
        info!("Access token refreshed");
        Ok(response)
    }
}
