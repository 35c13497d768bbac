//! Gmail submission and edits for YouTube family subscriptions

use log::info;

use super::busy::BusyFlag;
use crate::error::{Error, Field, Result};
use crate::subscriptions::{Subscription, SubscriptionsClient, YoutubeEmailUpdate};

const GMAIL_DOMAIN: &str = "@gmail.com";

pub const EDIT_LIMIT_REACHED: &str =
    "Maximum edit limit reached. Contact support if you need to change your Gmail.";

/// `^[a-zA-Z0-9._-]+@gmail\.com$`
pub fn is_gmail(email: &str) -> bool {
    match email.strip_suffix(GMAIL_DOMAIN) {
        Some(local) => {
            !local.is_empty()
                && local
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        }
        None => false,
    }
}

/// Validate a Gmail address against the one already stored, if any
pub fn validate_gmail(email: &str, current: Option<&str>) -> Result<()> {
    if email.trim().is_empty() {
        return Err(Error::validation(Field::Email, "Gmail ID is required"));
    }
    if !is_gmail(email) {
        return Err(Error::validation(
            Field::Email,
            "Please enter a valid Gmail address (must end with @gmail.com)",
        ));
    }
    if let Some(current) = current.filter(|c| !c.is_empty()) {
        if email == current {
            return Err(Error::validation(
                Field::Email,
                "New Gmail must be different from current Gmail",
            ));
        }
    }
    Ok(())
}

/// Edits are offered on YouTube and combo subscriptions with edits left
pub fn can_edit(subscription: &Subscription) -> bool {
    (subscription.is_youtube() || subscription.is_combo())
        && subscription.edit_count() < subscription.max_edits()
}

pub fn edits_remaining(subscription: &Subscription) -> u32 {
    subscription
        .max_edits()
        .saturating_sub(subscription.edit_count())
}

#[derive(Clone)]
pub struct YoutubeEmailFlow {
    subscriptions: SubscriptionsClient,
    busy: BusyFlag,
}

impl YoutubeEmailFlow {
    pub fn new(subscriptions: SubscriptionsClient) -> Self {
        Self {
            subscriptions,
            busy: BusyFlag::new("Gmail update"),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.busy.is_busy()
    }

    /// First submission right after a YouTube purchase
    pub async fn submit(
        &self,
        subscription_id: Option<&str>,
        email: &str,
    ) -> Result<YoutubeEmailUpdate> {
        validate_gmail(email, None)?;
        let subscription_id = subscription_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            Error::validation(
                Field::SubscriptionId,
                "Subscription ID not found. Please contact support.",
            )
        })?;

        let _guard = self.busy.acquire()?;
        let update = self
            .subscriptions
            .update_youtube_email(subscription_id, email)
            .await?;
        info!("Gmail submitted for subscription {}", subscription_id);
        Ok(update)
    }

    /// Replace the stored address, consuming one edit
    pub async fn edit(&self, subscription: &Subscription, email: &str) -> Result<YoutubeEmailUpdate> {
        if !can_edit(subscription) {
            return Err(Error::validation(Field::Email, EDIT_LIMIT_REACHED));
        }
        validate_gmail(email, subscription.youtube_email.as_deref())?;

        let _guard = self.busy.acquire()?;
        let update = self
            .subscriptions
            .update_youtube_email(&subscription.id, email)
            .await?;
        info!("Gmail updated for subscription {}", subscription.id);
        Ok(update)
    }
}
