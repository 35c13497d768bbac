//! Wallet top-up through the payment gateway

use log::{info, warn};
use serde_json::Value;

use super::busy::BusyFlag;
use crate::error::{Error, Field, Result};
use crate::sync::{ProfileSnapshot, ProfileSync};
use crate::wallet::{CheckoutOptions, GatewayOutcome, PaymentGateway, WalletClient};

pub const QUICK_AMOUNTS: [u32; 4] = [500, 1000, 2500, 5000];

pub const MIN_TOP_UP: f64 = 1.0;

pub fn validate_top_up(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(Field::Amount, "Please enter a valid amount"));
    }
    if amount < MIN_TOP_UP {
        return Err(Error::validation(Field::Amount, "Minimum amount is ₹1"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TopUpOutcome {
    pub verification: Value,
    pub profile: ProfileSnapshot,
    pub message: String,
}

#[derive(Clone)]
pub struct TopUpFlow {
    wallet: WalletClient,
    sync: ProfileSync,
    busy: BusyFlag,
}

impl TopUpFlow {
    pub fn new(wallet: WalletClient, sync: ProfileSync) -> Self {
        Self {
            wallet,
            sync,
            busy: BusyFlag::new("Add money"),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.busy.is_busy()
    }

    /// Create a gateway order, hand it to `gateway`, and verify the payment
    /// it reports. Closing the gateway without paying ends the flow with
    /// [`Error::Gateway`] and nothing is verified.
    pub async fn add_money(&self, amount: f64, gateway: &dyn PaymentGateway) -> Result<TopUpOutcome> {
        validate_top_up(amount)?;
        let _guard = self.busy.acquire()?;

        let order = self.wallet.add_money(amount).await?;
        let prefill = self.sync.sessions().cached_profile().unwrap_or_else(|e| {
            warn!("Could not read cached profile: {}", e);
            None
        });
        let options = CheckoutOptions::new(&order, prefill.as_ref());

        let payment = match gateway.checkout(&options).await? {
            GatewayOutcome::Paid(payment) => payment,
            GatewayOutcome::Dismissed => {
                info!("Checkout for order {} dismissed", options.order_id);
                return Err(Error::gateway("Payment cancelled"));
            }
        };

        let verification = self.wallet.verify_payment(&payment).await?;
        info!("Payment {} verified", payment.razorpay_payment_id);

        let profile = self.sync.refresh().await;
        Ok(TopUpOutcome {
            verification,
            profile,
            message: format!("Successfully added ₹{:.2} to your wallet!", amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_up_minimum() {
        assert_eq!(
            validate_top_up(0.5).unwrap_err().to_string(),
            "Minimum amount is ₹1"
        );
        assert_eq!(
            validate_top_up(-5.0).unwrap_err().to_string(),
            "Please enter a valid amount"
        );
        assert!(validate_top_up(1.0).is_ok());
        assert!(QUICK_AMOUNTS.iter().all(|a| validate_top_up(*a as f64).is_ok()));
    }
}
