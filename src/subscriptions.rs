//! Subscriptions owned by the signed-in user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::fetch::ApiClient;
use crate::timestamp::parse_timestamp;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    ExpiringSoon,
    Expired,
    Cancelled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub platform_name: String,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub credentials: Option<Value>,
    #[serde(default)]
    pub youtube_email: Option<String>,
    #[serde(default)]
    pub youtube_email_edit_count: Option<u32>,
    #[serde(default)]
    pub youtube_email_max_edits: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Subscription {
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.end_date)
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.start_date)
    }

    /// Whole days left at `now`, rounded up and never negative. Computed at
    /// render time; nothing stores it.
    pub fn remaining_days(&self, now: DateTime<Utc>) -> i64 {
        let end = match self.end_date() {
            Some(end) => end,
            None => return 0,
        };
        let millis = (end - now).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        let day_millis = SECONDS_PER_DAY * 1000;
        (millis + day_millis - 1) / day_millis
    }

    pub fn is_youtube(&self) -> bool {
        self.platform_name.to_lowercase().contains("youtube")
    }

    pub fn is_combo(&self) -> bool {
        self.platform_name.to_lowercase().contains("combo")
    }

    pub fn edit_count(&self) -> u32 {
        self.youtube_email_edit_count.unwrap_or(0)
    }

    /// Absent or zero means one edit
    pub fn max_edits(&self) -> u32 {
        self.youtube_email_max_edits.filter(|max| *max > 0).unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionsResponse {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// Subscription fields echoed back after a YouTube email change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeEmailState {
    pub id: String,
    #[serde(default)]
    pub youtube_email: Option<String>,
    #[serde(default)]
    pub youtube_email_edit_count: Option<u32>,
    #[serde(default)]
    pub youtube_email_max_edits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeEmailUpdate {
    #[serde(default)]
    pub message: Option<String>,
    pub subscription: YoutubeEmailState,
}

/// Client for the `/subscriptions` endpoints
#[derive(Clone)]
pub struct SubscriptionsClient {
    api: ApiClient,
}

impl SubscriptionsClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn mine(&self) -> Result<Vec<Subscription>> {
        let response: SubscriptionsResponse = self
            .api
            .get("/subscriptions/my-subscriptions")?
            .execute()
            .await?;
        Ok(response.subscriptions)
    }

    pub async fn get(&self, subscription_id: &str) -> Result<Subscription> {
        self.api
            .get("/subscriptions")?
            .segment(subscription_id)
            .execute()
            .await
    }

    pub async fn update_youtube_email(
        &self,
        subscription_id: &str,
        email: &str,
    ) -> Result<YoutubeEmailUpdate> {
        self.api
            .put("/subscriptions")?
            .segment(subscription_id)
            .segment("update-youtube-email")
            .json(&json!({ "email": email }))?
            .execute()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subscription(end_date: &str) -> Subscription {
        serde_json::from_value(json!({
            "id": "s1",
            "platform_name": "YouTube Premium",
            "plan_name": "Family",
            "status": "expiring_soon",
            "start_date": "2024-01-01T00:00:00",
            "end_date": end_date
        }))
        .unwrap()
    }

    #[test]
    fn remaining_days_rounds_up_and_floors_at_zero() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(subscription("2024-01-11T00:00:00").remaining_days(now), 1);
        assert_eq!(subscription("2024-01-12T12:00:00").remaining_days(now), 2);
        assert_eq!(subscription("2024-01-12T12:00:01").remaining_days(now), 3);
        assert_eq!(subscription("2024-01-01T00:00:00").remaining_days(now), 0);
    }

    #[test]
    fn edit_counters_default() {
        let sub = subscription("2024-02-01T00:00:00");
        assert_eq!(sub.status, SubscriptionStatus::ExpiringSoon);
        assert_eq!(sub.edit_count(), 0);
        assert_eq!(sub.max_edits(), 1);
        assert!(sub.is_youtube());
        assert!(!sub.is_combo());
    }

    #[test]
    fn zero_max_edits_allows_one_edit() {
        let mut sub = subscription("2024-02-01T00:00:00");
        sub.youtube_email_max_edits = Some(0);
        assert_eq!(sub.max_edits(), 1);

        sub.youtube_email_max_edits = Some(3);
        assert_eq!(sub.max_edits(), 3);
    }
}
