//! Shared profile and balance synchronization
//!
//! [`ProfileSync`] is the one place the profile is fetched. Responses are
//! kept in a [`QueryCache`] keyed by endpoint, so concurrent callers share a
//! single request and callers within the freshness window share its result.
//! Failed fetches fall back to the persisted profile, then to defaults.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use crate::auth::session::SessionProvider;
use crate::auth::{AuthClient, UserProfile};
use crate::error::{Error, Result};

const PROFILE_KEY: &str = "GET /auth/me";

struct Entry {
    value: Value,
    fetched_at: Instant,
}

type Slot = Arc<AsyncMutex<Option<Entry>>>;

/// Response cache keyed by endpoint and parameters.
///
/// Only successful responses are stored. A slot is locked for the duration
/// of its fetch, which is what de-duplicates concurrent requests. Keys are
/// written to the debug log and must not carry credentials.
pub struct QueryCache {
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Result<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::storage("query cache lock poisoned"))?;
        Ok(slots.entry(key.to_string()).or_default().clone())
    }

    /// Return the cached value for `key` if still fresh, otherwise run
    /// `fetch` and cache what it returns.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let slot = self.slot(key)?;
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                debug!("Cache hit for {}", key);
                return serde_json::from_value(cached.value.clone()).map_err(Error::Decode);
            }
        }

        let value = fetch().await?;
        *entry = Some(Entry {
            value: serde_json::to_value(&value)?,
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    pub fn invalidate(&self, key: &str) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
    }

    /// Number of keys currently holding a slot
    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a displayed profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    Server,
    Cached,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub profile: UserProfile,
    pub source: ProfileSource,
    /// The fetch failure that forced a fallback
    pub error: Option<String>,
}

impl ProfileSnapshot {
    /// Only a profile fetched just now is `Confirmed`. A saved profile is
    /// shown as pending a refresh, and defaults carry no amount at all.
    pub fn balance(&self) -> DisplayedBalance {
        match self.source {
            ProfileSource::Server => DisplayedBalance::Confirmed(self.profile.wallet_balance),
            ProfileSource::Cached => DisplayedBalance::RefreshPending {
                last_confirmed: self.profile.wallet_balance,
            },
            ProfileSource::Default => DisplayedBalance::Unknown,
        }
    }
}

/// A wallet balance as shown to the user.
///
/// The amount only ever comes from a profile response. After a
/// balance-changing action the display moves to `RefreshPending` until the
/// next snapshot arrives; there is no way to add to or subtract from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayedBalance {
    Confirmed(f64),
    RefreshPending { last_confirmed: f64 },
    /// Nothing has ever been received from the server
    Unknown,
}

impl DisplayedBalance {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Confirmed(amount) => Some(*amount),
            Self::RefreshPending { last_confirmed } => Some(*last_confirmed),
            Self::Unknown => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::RefreshPending { .. })
    }

    /// The server accepted a balance-changing action
    pub fn mark_pending(self) -> Self {
        match self.amount() {
            Some(last_confirmed) => Self::RefreshPending { last_confirmed },
            None => Self::Unknown,
        }
    }

    /// Replace with whatever the latest snapshot says
    pub fn confirm(self, snapshot: &ProfileSnapshot) -> Self {
        snapshot.balance()
    }
}

impl fmt::Display for DisplayedBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed(amount) => write!(f, "₹{:.2}", amount),
            Self::RefreshPending { last_confirmed } => {
                write!(f, "₹{:.2} (refresh pending)", last_confirmed)
            }
            Self::Unknown => f.write_str("unavailable"),
        }
    }
}

/// Fetches the signed-in user's profile with the persisted fallback
#[derive(Clone)]
pub struct ProfileSync {
    auth: AuthClient,
    sessions: SessionProvider,
    cache: Arc<QueryCache>,
    /// Token the cached profile was fetched with
    owner: Arc<Mutex<Option<String>>>,
}

impl ProfileSync {
    pub(crate) fn new(auth: AuthClient, sessions: SessionProvider, ttl: Duration) -> Self {
        Self {
            auth,
            sessions,
            cache: Arc::new(QueryCache::new(ttl)),
            owner: Arc::new(Mutex::new(None)),
        }
    }

    pub fn sessions(&self) -> &SessionProvider {
        &self.sessions
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Current profile, reusing a fresh cached response
    pub async fn load(&self) -> ProfileSnapshot {
        self.rescope();
        let auth = self.auth.clone();
        let fetched = self
            .cache
            .get_or_fetch(PROFILE_KEY, || async move { auth.me().await })
            .await;

        match fetched {
            Ok(profile) => {
                if let Err(e) = self.sessions.store_profile(&profile) {
                    warn!("Could not persist profile: {}", e);
                }
                ProfileSnapshot {
                    profile,
                    source: ProfileSource::Server,
                    error: None,
                }
            }
            Err(e) => self.fallback(e),
        }
    }

    /// Fetch from the server regardless of cache freshness. Called after
    /// every balance-changing action.
    pub async fn refresh(&self) -> ProfileSnapshot {
        self.cache.invalidate(PROFILE_KEY);
        self.load().await
    }

    /// Drop the cached profile when the stored token is not the one it was
    /// fetched with, so a new sign-in never sees the previous user's profile
    fn rescope(&self) {
        let token = self.sessions.access_token().unwrap_or_default();
        if let Ok(mut owner) = self.owner.lock() {
            if *owner != token {
                self.cache.invalidate(PROFILE_KEY);
                *owner = token;
            }
        }
    }

    fn fallback(&self, error: Error) -> ProfileSnapshot {
        warn!("Error fetching user data: {}", error);
        let message = Some(error.message());

        match self.sessions.cached_profile() {
            Ok(Some(profile)) => ProfileSnapshot {
                profile,
                source: ProfileSource::Cached,
                error: message,
            },
            Ok(None) => ProfileSnapshot {
                profile: UserProfile::default(),
                source: ProfileSource::Default,
                error: message,
            },
            Err(e) => {
                warn!("Could not read cached profile: {}", e);
                ProfileSnapshot {
                    profile: UserProfile::default(),
                    source: ProfileSource::Default,
                    error: message,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fresh_entries_are_reused() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: u32 = cache
                .get_or_fetch("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Error>(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("k");
        let _: u32 = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(8)
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let failed: Result<u32> = cache
            .get_or_fetch("k", || async { Err(Error::InvalidResponse) })
            .await;
        assert!(failed.is_err());

        let value: u32 = cache.get_or_fetch("k", || async { Ok::<_, Error>(1) }).await.unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_fetch("k", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, Error>(5u32)
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 5);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn displayed_balance_only_moves_on_snapshots() {
        let shown = DisplayedBalance::Confirmed(500.0).mark_pending();
        assert!(shown.is_pending());
        assert_eq!(shown.amount(), Some(500.0));

        let snapshot = ProfileSnapshot {
            profile: UserProfile {
                wallet_balance: 401.0,
                ..Default::default()
            },
            source: ProfileSource::Server,
            error: None,
        };
        let shown = shown.confirm(&snapshot);
        assert_eq!(shown, DisplayedBalance::Confirmed(401.0));
    }

    fn snapshot(balance: f64, source: ProfileSource) -> ProfileSnapshot {
        ProfileSnapshot {
            profile: UserProfile {
                wallet_balance: balance,
                ..Default::default()
            },
            source,
            error: None,
        }
    }

    #[test]
    fn only_server_snapshots_are_confirmed() {
        assert_eq!(
            snapshot(120.0, ProfileSource::Server).balance(),
            DisplayedBalance::Confirmed(120.0)
        );
        assert_eq!(
            snapshot(120.0, ProfileSource::Cached).balance(),
            DisplayedBalance::RefreshPending { last_confirmed: 120.0 }
        );

        let unknown = snapshot(0.0, ProfileSource::Default).balance();
        assert_eq!(unknown, DisplayedBalance::Unknown);
        assert_eq!(unknown.amount(), None);
        assert_eq!(unknown.mark_pending(), DisplayedBalance::Unknown);
        assert_eq!(unknown.to_string(), "unavailable");
    }

    #[test]
    fn displayed_balance_text() {
        assert_eq!(DisplayedBalance::Confirmed(99.5).to_string(), "₹99.50");
        assert_eq!(
            DisplayedBalance::RefreshPending { last_confirmed: 10.0 }.to_string(),
            "₹10.00 (refresh pending)"
        );
    }
}
