//! Referral program: codes, commissions and withdrawals

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::types::null_as_zero;
use crate::error::Result;
use crate::fetch::ApiClient;

/// Smallest withdrawal accepted when the dashboard does not report one
pub const DEFAULT_MIN_WITHDRAWAL: f64 = 100.0;

fn default_commission_rate() -> f64 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralCode {
    pub referral_code: String,
}

/// A user who signed up with this user's code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: String,
    #[serde(default)]
    pub referred_user_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub topup_amount: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub commission_amount: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralDashboard {
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub total_referrals: u32,
    #[serde(default)]
    pub active_referrals: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_earnings: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub withdrawable_balance: f64,
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default)]
    pub min_withdrawal_amount: Option<f64>,
    #[serde(default)]
    pub referrals: Vec<Referral>,
    #[serde(default)]
    pub recent_commissions: Vec<Commission>,
}

impl ReferralDashboard {
    /// The server's minimum, or [`DEFAULT_MIN_WITHDRAWAL`]
    pub fn min_withdrawal(&self) -> f64 {
        self.min_withdrawal_amount
            .filter(|min| *min > 0.0)
            .unwrap_or(DEFAULT_MIN_WITHDRAWAL)
    }
}

/// Body of `POST /referrals/withdraw`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub upi_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount: f64,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WithdrawalHistory {
    #[serde(default)]
    withdrawals: Vec<Withdrawal>,
}

/// Client for the `/referrals` endpoints
#[derive(Clone)]
pub struct ReferralsClient {
    api: ApiClient,
}

impl ReferralsClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn my_code(&self) -> Result<ReferralCode> {
        self.api.get("/referrals/my-code")?.execute().await
    }

    pub async fn apply(&self, referral_code: &str) -> Result<Value> {
        self.api
            .post("/referrals/apply")?
            .json(&json!({ "referral_code": referral_code }))?
            .execute_value()
            .await
    }

    pub async fn dashboard(&self) -> Result<ReferralDashboard> {
        self.api.get("/referrals/dashboard")?.execute().await
    }

    /// Submit a payout request. Callers validate first; see
    /// [`crate::flows::withdrawal`].
    pub async fn withdraw(&self, request: &WithdrawalRequest) -> Result<WithdrawalReceipt> {
        self.api
            .post("/referrals/withdraw")?
            .json(request)?
            .execute()
            .await
    }

    pub async fn withdrawal_history(&self) -> Result<Vec<Withdrawal>> {
        let history: WithdrawalHistory = self
            .api
            .get("/referrals/withdrawal-history")?
            .execute()
            .await?;
        Ok(history.withdrawals)
    }
}
