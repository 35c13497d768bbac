//! Wallet balance, transactions and top-ups

pub mod checkout;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::fetch::ApiClient;
use crate::timestamp::parse_timestamp;

pub use checkout::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub balance: f64,
}

/// Direction of a wallet movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    pub amount: f64,

    pub balance_after: f64,

    #[serde(default)]
    pub reference_type: Option<String>,

    #[serde(default)]
    pub reference_id: Option<String>,

    #[serde(default)]
    pub description: String,

    pub created_at: String,
}

impl WalletTransaction {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<WalletTransaction>,
}

/// Gateway order created by `POST /wallet/add-money`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMoneyResponse {
    pub order_id: String,

    /// Amount in major currency units
    pub amount: f64,

    pub currency: String,

    pub razorpay_key: String,
}

/// Fields the gateway hands back after a completed payment, posted verbatim
/// to `POST /wallet/verify-payment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Client for the `/wallet` endpoints
#[derive(Clone)]
pub struct WalletClient {
    api: ApiClient,
}

impl WalletClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn balance(&self) -> Result<WalletBalance> {
        self.api.get("/wallet/balance")?.execute().await
    }

    pub async fn history(&self) -> Result<Value> {
        self.api.get("/wallet/history")?.execute_value().await
    }

    pub async fn transactions(&self) -> Result<Vec<WalletTransaction>> {
        let response: TransactionsResponse =
            self.api.get("/wallet/transactions")?.execute().await?;
        Ok(response.transactions)
    }

    /// Create a gateway order for `amount` (major units)
    pub async fn add_money(&self, amount: f64) -> Result<AddMoneyResponse> {
        self.api
            .post("/wallet/add-money")?
            .json(&json!({ "amount": amount }))?
            .execute()
            .await
    }

    pub async fn verify_payment(&self, payment: &VerifyPaymentRequest) -> Result<Value> {
        self.api
            .post("/wallet/verify-payment")?
            .json(payment)?
            .execute_value()
            .await
    }
}
