//! Confirmation flows for actions that move money or change account data
//!
//! Each flow checks its local preconditions first, so a rejected form never
//! reaches the network, then runs the request under a [`BusyFlag`]. The
//! server stays the authority on every check repeated here.

pub mod busy;
pub mod profile;
pub mod purchase;
pub mod top_up;
pub mod withdrawal;
pub mod youtube_email;

pub use busy::{BusyFlag, BusyGuard};
pub use profile::ProfileEditor;
pub use purchase::{
    GmailRequestState, Navigation, PaymentMethod, PurchaseDialog, PurchaseFlow, PurchaseOutcome,
};
pub use top_up::{validate_top_up, TopUpFlow, TopUpOutcome, QUICK_AMOUNTS};
pub use withdrawal::{validate_withdrawal, Destination, WithdrawalFlow, WithdrawalOutcome};
pub use youtube_email::{can_edit, is_gmail, validate_gmail, YoutubeEmailFlow};

use crate::error::{Error, Field, Result};

/// Parse an amount typed into a form field
pub fn parse_amount(input: &str) -> Result<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or_else(|| Error::validation(Field::Amount, "Please enter a valid amount"))
}
