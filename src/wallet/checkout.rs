//! Payment gateway handshake
//!
//! The checkout widget itself is external. The client only builds the
//! options it is opened with and relays the fields it returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::UserProfile;
use crate::error::Result;
use crate::wallet::{AddMoneyResponse, VerifyPaymentRequest};

pub const MERCHANT_NAME: &str = "OTTSONLY";
pub const TOP_UP_DESCRIPTION: &str = "Add Money to Wallet";

/// Contact details pre-filled in the checkout form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Options the checkout widget is opened with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub key: String,

    /// Amount in minor units (paise)
    pub amount: u64,

    pub currency: String,

    pub name: String,

    pub description: String,

    pub order_id: String,

    pub prefill: Prefill,
}

/// Convert a major-unit amount to minor units
pub fn to_minor_units(amount: f64) -> u64 {
    (amount * 100.0).round().max(0.0) as u64
}

impl CheckoutOptions {
    pub fn new(order: &AddMoneyResponse, profile: Option<&UserProfile>) -> Self {
        let prefill = profile
            .map(|p| Prefill {
                name: p.name.clone().unwrap_or_default(),
                email: p.email.clone().unwrap_or_default(),
                contact: p.phone.clone().unwrap_or_default(),
            })
            .unwrap_or_default();

        Self {
            key: order.razorpay_key.clone(),
            amount: to_minor_units(order.amount),
            currency: order.currency.clone(),
            name: MERCHANT_NAME.to_string(),
            description: TOP_UP_DESCRIPTION.to_string(),
            order_id: order.order_id.clone(),
            prefill,
        }
    }
}

/// How the checkout widget closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// Payment completed; carries the fields to verify
    Paid(VerifyPaymentRequest),

    /// The user closed the widget
    Dismissed,
}

/// The external checkout widget
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn checkout(&self, options: &CheckoutOptions) -> Result<GatewayOutcome>;
}
