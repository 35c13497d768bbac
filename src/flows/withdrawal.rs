//! Referral earnings withdrawal

use log::{info, warn};

use super::busy::BusyFlag;
use crate::error::{Error, Field, Result};
use crate::referrals::{ReferralDashboard, ReferralsClient, WithdrawalReceipt, WithdrawalRequest};
use crate::sync::{ProfileSnapshot, ProfileSync};

/// Where a payout goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Upi(String),
    Bank {
        account_number: String,
        ifsc_code: String,
        account_holder_name: String,
    },
}

/// Check a withdrawal against the dashboard before anything is sent.
///
/// Order of checks: amount present and positive, at least the minimum, no
/// more than the withdrawable balance, destination filled in. Payouts go to
/// UPI only, so a complete bank destination is still rejected.
pub fn validate_withdrawal(
    amount: f64,
    destination: &Destination,
    dashboard: &ReferralDashboard,
) -> Result<WithdrawalRequest> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(Field::Amount, "Please enter a valid amount"));
    }

    let min = dashboard.min_withdrawal();
    if amount < min {
        return Err(Error::validation(
            Field::Amount,
            format!("Minimum withdrawal amount is ₹{}", min),
        ));
    }

    if amount > dashboard.withdrawable_balance {
        return Err(Error::validation(
            Field::Amount,
            "Insufficient withdrawable balance",
        ));
    }

    match destination {
        Destination::Upi(upi_id) => {
            let upi_id = upi_id.trim();
            if upi_id.is_empty() {
                return Err(Error::validation(Field::Destination, "Please enter UPI ID"));
            }
            Ok(WithdrawalRequest {
                amount,
                upi_id: upi_id.to_string(),
            })
        }
        Destination::Bank {
            account_number,
            ifsc_code,
            account_holder_name,
        } => {
            if [account_number, ifsc_code, account_holder_name]
                .iter()
                .any(|v| v.trim().is_empty())
            {
                return Err(Error::validation(
                    Field::Destination,
                    "Please fill all bank details",
                ));
            }
            Err(Error::validation(
                Field::Destination,
                "Bank transfers are not available. Please enter a UPI ID",
            ))
        }
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawalOutcome {
    pub receipt: WithdrawalReceipt,
    pub profile: ProfileSnapshot,
    /// Reloaded after the request; `None` if the reload failed
    pub dashboard: Option<ReferralDashboard>,
}

#[derive(Clone)]
pub struct WithdrawalFlow {
    referrals: ReferralsClient,
    sync: ProfileSync,
    busy: BusyFlag,
}

impl WithdrawalFlow {
    pub fn new(referrals: ReferralsClient, sync: ProfileSync) -> Self {
        Self {
            referrals,
            sync,
            busy: BusyFlag::new("Withdrawal"),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn submit(
        &self,
        amount: f64,
        destination: &Destination,
        dashboard: &ReferralDashboard,
    ) -> Result<WithdrawalOutcome> {
        let request = validate_withdrawal(amount, destination, dashboard)?;
        let _guard = self.busy.acquire()?;

        let receipt = self.referrals.withdraw(&request).await?;
        info!("Withdrawal of {} requested", request.amount);

        let profile = self.sync.refresh().await;
        let dashboard = match self.referrals.dashboard().await {
            Ok(dashboard) => Some(dashboard),
            Err(e) => {
                warn!("Error fetching referral dashboard: {}", e);
                None
            }
        };

        Ok(WithdrawalOutcome {
            receipt,
            profile,
            dashboard,
        })
    }
}
