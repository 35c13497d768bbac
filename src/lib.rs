//! OTTSONLY Rust Client Library
//!
//! A Rust client for the OTTSONLY subscription marketplace: accounts and
//! sessions, the plan catalog, orders, wallet top-ups, subscriptions,
//! YouTube family requests, referrals and the admin console.
//!
//! Every request is sent at most once. Nothing is retried, and a 401 is
//! returned to the caller like any other failure.

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod flows;
pub mod history;
pub mod orders;
pub mod products;
pub mod referrals;
pub mod store;
pub mod subscriptions;
pub mod sync;
pub mod user;
pub mod wallet;
pub mod youtube;

mod timestamp;

use std::sync::Arc;

use log::info;
use url::Url;

use crate::admin::AdminClient;
use crate::auth::{AuthClient, SessionProvider};
use crate::config::{ClientConfig, ClientOptions};
use crate::error::Result;
use crate::fetch::ApiClient;
use crate::flows::{ProfileEditor, PurchaseFlow, TopUpFlow, WithdrawalFlow, YoutubeEmailFlow};
use crate::history::HistoryClient;
use crate::orders::OrdersClient;
use crate::products::ProductsClient;
use crate::referrals::ReferralsClient;
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::subscriptions::SubscriptionsClient;
use crate::sync::ProfileSync;
use crate::user::UserClient;
use crate::wallet::WalletClient;
use crate::youtube::YoutubeClient;

/// The main entry point for the OTTSONLY client
#[derive(Clone)]
pub struct Ottsonly {
    api: ApiClient,
    sync: ProfileSync,
    options: ClientOptions,
    flows: Arc<Flows>,
}

/// Created once per client so every caller shares the same busy flags
struct Flows {
    profile: ProfileEditor,
    purchase: PurchaseFlow,
    withdrawal: WithdrawalFlow,
    top_up: TopUpFlow,
    youtube_email: YoutubeEmailFlow,
}

impl Ottsonly {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ottsonly_client::{config::ClientOptions, Ottsonly};
    ///
    /// let client = Ottsonly::new("http://localhost:8000", ClientOptions::default()).unwrap();
    /// ```
    pub fn new(api_url: &str, options: ClientOptions) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_url, options)?)
    }

    /// Create a client configured from `OTTSONLY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a client from a prepared configuration. The session is kept
    /// on disk unless `persist_session` is off.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = if config.options.persist_session {
            Arc::new(FileStore::new(config.options.resolved_session_path()))
        } else {
            Arc::new(MemoryStore::new())
        };
        Self::with_store(&config.api_url, config.options, store)
    }

    /// Create a client backed by a caller-supplied session store
    pub fn with_store(
        api_url: &Url,
        options: ClientOptions,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let sessions = SessionProvider::new(store);
        let api = ApiClient::new(api_url, sessions.clone(), &options)?;
        let sync = ProfileSync::new(AuthClient::new(api.clone()), sessions, options.profile_ttl);

        let flows = Arc::new(Flows {
            profile: ProfileEditor::new(UserClient::new(api.clone()), sync.clone()),
            purchase: PurchaseFlow::new(OrdersClient::new(api.clone()), sync.clone()),
            withdrawal: WithdrawalFlow::new(ReferralsClient::new(api.clone()), sync.clone()),
            top_up: TopUpFlow::new(WalletClient::new(api.clone()), sync.clone()),
            youtube_email: YoutubeEmailFlow::new(SubscriptionsClient::new(api.clone())),
        });

        Ok(Self {
            api,
            sync,
            options,
            flows,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn sessions(&self) -> &SessionProvider {
        self.api.sessions()
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    pub fn user(&self) -> UserClient {
        UserClient::new(self.api.clone())
    }

    pub fn wallet(&self) -> WalletClient {
        WalletClient::new(self.api.clone())
    }

    pub fn products(&self) -> ProductsClient {
        ProductsClient::new(self.api.clone())
    }

    pub fn orders(&self) -> OrdersClient {
        OrdersClient::new(self.api.clone())
    }

    pub fn subscriptions(&self) -> SubscriptionsClient {
        SubscriptionsClient::new(self.api.clone())
    }

    pub fn youtube(&self) -> YoutubeClient {
        YoutubeClient::new(self.api.clone())
    }

    pub fn history(&self) -> HistoryClient {
        HistoryClient::new(self.api.clone())
    }

    pub fn admin(&self) -> AdminClient {
        AdminClient::new(self.api.clone())
    }

    pub fn referrals(&self) -> ReferralsClient {
        ReferralsClient::new(self.api.clone())
    }

    /// The shared profile fetcher; every flow refreshes through this one
    pub fn profile_sync(&self) -> &ProfileSync {
        &self.sync
    }

    pub fn profile_editor(&self) -> &ProfileEditor {
        &self.flows.profile
    }

    pub fn purchase_flow(&self) -> &PurchaseFlow {
        &self.flows.purchase
    }

    pub fn withdrawal_flow(&self) -> &WithdrawalFlow {
        &self.flows.withdrawal
    }

    pub fn top_up_flow(&self) -> &TopUpFlow {
        &self.flows.top_up
    }

    pub fn youtube_email_flow(&self) -> &YoutubeEmailFlow {
        &self.flows.youtube_email
    }

    /// End the session locally: tokens and cached profile are removed and
    /// cached responses dropped. No request is sent; use
    /// [`AuthClient::logout`] to also notify the server.
    pub fn logout(&self) -> Result<()> {
        self.sessions().clear()?;
        self.sync.cache().clear();
        info!("Logged out");
        Ok(())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientConfig, ClientOptions};
    pub use crate::error::{Error, Field, Result};
    pub use crate::filter::{PlanFilter, PlanSort, SubscriptionFilter, TransactionFilter};
    pub use crate::flows::{Destination, Navigation, PaymentMethod, PurchaseDialog};
    pub use crate::products::{build_catalog, Plan};
    pub use crate::Ottsonly;
}
