//! Plan purchase confirmation

use log::info;
use serde::{Deserialize, Serialize};

use super::busy::BusyFlag;
use crate::error::{Error, Field, Result};
use crate::orders::{Order, OrdersClient};
use crate::products::Plan;
use crate::sync::{ProfileSnapshot, ProfileSync};

pub const INSUFFICIENT_BALANCE_WARNING: &str =
    "Insufficient wallet balance. Please add money to your wallet or choose another payment method.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Wallet,
    Card,
}

/// State of the purchase confirmation dialog for one plan
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDialog {
    pub plan: Plan,
    pub wallet_balance: f64,
    pub payment_method: PaymentMethod,
    pub terms_accepted: bool,
}

impl PurchaseDialog {
    pub fn new(plan: Plan, wallet_balance: f64) -> Self {
        Self {
            plan,
            wallet_balance,
            payment_method: PaymentMethod::default(),
            terms_accepted: false,
        }
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn accept_terms(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    /// Paying from a wallet that cannot cover the price
    pub fn insufficient_balance(&self) -> bool {
        self.payment_method == PaymentMethod::Wallet
            && self.wallet_balance < self.plan.discounted_price
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.insufficient_balance()
            .then_some(INSUFFICIENT_BALANCE_WARNING)
    }

    /// Local preconditions only. The server re-checks the balance.
    pub fn validate(&self) -> Result<()> {
        if !self.terms_accepted {
            return Err(Error::validation(
                Field::Terms,
                "Please accept the terms and conditions",
            ));
        }
        if self.insufficient_balance() {
            return Err(Error::validation(
                Field::PaymentMethod,
                INSUFFICIENT_BALANCE_WARNING,
            ));
        }
        Ok(())
    }

    pub fn can_confirm(&self, processing: bool) -> bool {
        !processing && self.validate().is_ok()
    }
}

/// What the Gmail submission screen needs after a YouTube purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailRequestState {
    pub order_id: String,
    pub subscription_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub plan_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    YoutubeGmailRequest(GmailRequestState),
    MySubscriptions,
}

#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub order: Order,
    pub profile: ProfileSnapshot,
    pub message: String,
    pub navigation: Navigation,
}

/// Places orders behind the dialog's preconditions
#[derive(Clone)]
pub struct PurchaseFlow {
    orders: OrdersClient,
    sync: ProfileSync,
    busy: BusyFlag,
}

impl PurchaseFlow {
    pub fn new(orders: OrdersClient, sync: ProfileSync) -> Self {
        Self {
            orders,
            sync,
            busy: BusyFlag::new("Purchase"),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn can_confirm(&self, dialog: &PurchaseDialog) -> bool {
        dialog.can_confirm(self.is_processing())
    }

    /// Issue exactly one order request, then refresh the profile before
    /// reporting success.
    pub async fn confirm(&self, dialog: &PurchaseDialog) -> Result<PurchaseOutcome> {
        dialog.validate()?;
        let _guard = self.busy.acquire()?;

        let plan = &dialog.plan;
        let order = self.orders.create(&plan.id).await?;
        info!("Order {} placed for product {}", order.id, plan.id);

        let profile = self.sync.refresh().await;
        let message = format!("Successfully purchased {} for {}!", plan.name, plan.platform);

        let navigation = if plan.is_youtube() {
            Navigation::YoutubeGmailRequest(GmailRequestState {
                order_id: order.id.clone(),
                subscription_id: order.subscription_id.clone(),
                user_id: Some(profile.profile.id.clone()).filter(|id| !id.is_empty()),
                username: profile.profile.name.clone(),
                plan_name: plan.name.clone(),
                amount: plan.discounted_price,
            })
        } else {
            Navigation::MySubscriptions
        };

        Ok(PurchaseOutcome {
            order,
            profile,
            message,
            navigation,
        })
    }
}
