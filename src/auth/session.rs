//! Session management for authentication
//!
//! The access token is never cached in memory: [`SessionProvider`] reads it
//! from the persisted store on every call, so a logout or refresh recorded by
//! another process is honored by the next request issued here.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::auth::types::{TokenResponse, UserProfile};
use crate::error::Result;
use crate::store::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token, when the server issued one
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

impl Session {
    /// Expiry recorded in the access token's `exp` claim.
    ///
    /// The signature is not checked; the server remains the authority on
    /// whether the token is valid.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let header = decode_header(&self.access_token).ok()?;
        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<ExpiryClaims>(
            &self.access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?;

        data.claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Check if the session has expired at `now`. Tokens without a readable
    /// `exp` claim are treated as unexpired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

/// Reads and writes the session and the cached profile
#[derive(Clone)]
pub struct SessionProvider {
    store: Arc<dyn KeyValueStore>,
}

impl SessionProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The bearer token to attach to the next request
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get_item(ACCESS_TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get_item(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    /// The current session, if an access token is stored
    pub fn session(&self) -> Result<Option<Session>> {
        let access_token = match self.access_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        Ok(Some(Session {
            access_token,
            refresh_token: self.refresh_token()?,
        }))
    }

    pub fn is_logged_in(&self) -> Result<bool> {
        Ok(self.access_token()?.is_some())
    }

    /// Persist the tokens and profile returned by login, registration or OTP
    /// verification. Completes before the caller moves on.
    pub fn persist_login(&self, response: &TokenResponse) -> Result<()> {
        self.store.set_item(ACCESS_TOKEN_KEY, &response.access_token)?;
        if let Some(refresh_token) = &response.refresh_token {
            self.store.set_item(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        self.store_profile(&response.user)?;
        info!("Session stored for user {}", response.user.id);
        Ok(())
    }

    /// Persist a rotated token pair without touching the cached profile
    pub fn persist_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
        self.store.set_item(ACCESS_TOKEN_KEY, access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.store.set_item(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(())
    }

    /// The last profile written by a successful fetch. An unreadable copy is
    /// reported and treated as absent.
    pub fn cached_profile(&self) -> Result<Option<UserProfile>> {
        let raw = match self.store.get_item(USER_KEY)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("Error parsing cached user data: {}", e);
                Ok(None)
            }
        }
    }

    pub fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(profile)?;
        self.store.set_item(USER_KEY, &raw)
    }

    /// Drop the access token, refresh token and cached profile together
    pub fn clear(&self) -> Result<()> {
        self.store
            .remove_items(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY])?;
        info!("Session cleared");
        Ok(())
    }
}
