use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::subscriptions::{Subscription, SubscriptionStatus};

/// Lowercase with whitespace runs replaced by `_`, e.g. `youtube_premium`
pub fn subscription_platform_key(platform: &str) -> String {
    platform
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTab {
    /// `active` and `expiring_soon`
    #[default]
    Active,
    Expired,
}

impl SubscriptionTab {
    pub fn includes(&self, status: SubscriptionStatus) -> bool {
        match self {
            Self::Active => matches!(
                status,
                SubscriptionStatus::Active | SubscriptionStatus::ExpiringSoon
            ),
            Self::Expired => status == SubscriptionStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub tab: SubscriptionTab,
    /// Substring of the platform or plan name
    pub query: Option<String>,
    /// Compared against [`subscription_platform_key`]
    pub platform: Option<String>,
}

impl SubscriptionFilter {
    pub fn new(tab: SubscriptionTab) -> Self {
        Self {
            tab,
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn matches(&self, sub: &Subscription) -> bool {
        if !self.tab.includes(sub.status) {
            return false;
        }

        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            if !contains_ignore_case(&sub.platform_name, &query)
                && !contains_ignore_case(&sub.plan_name, &query)
            {
                return false;
            }
        }

        match &self.platform {
            Some(platform) => {
                subscription_platform_key(&sub.platform_name) == subscription_platform_key(platform)
            }
            None => true,
        }
    }

    pub fn apply(&self, subscriptions: &[Subscription]) -> Vec<Subscription> {
        subscriptions
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }

    /// Count per tab, for the tab badges
    pub fn tab_count(subscriptions: &[Subscription], tab: SubscriptionTab) -> usize {
        subscriptions.iter().filter(|s| tab.includes(s.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sub(id: &str, platform: &str, plan: &str, status: &str) -> Subscription {
        serde_json::from_value(json!({
            "id": id,
            "platform_name": platform,
            "plan_name": plan,
            "status": status,
            "start_date": "2024-01-01T00:00:00",
            "end_date": "2024-02-01T00:00:00"
        }))
        .unwrap()
    }

    fn subs() -> Vec<Subscription> {
        vec![
            sub("1", "Netflix", "Premium", "active"),
            sub("2", "YouTube Premium", "Family", "expiring_soon"),
            sub("3", "Amazon Prime Video", "Annual", "expired"),
            sub("4", "Netflix", "Basic", "cancelled"),
        ]
    }

    fn ids(list: Vec<Subscription>) -> Vec<String> {
        list.into_iter().map(|s| s.id).collect()
    }

    #[test]
    fn tabs_partition_by_status() {
        assert_eq!(ids(SubscriptionFilter::new(SubscriptionTab::Active).apply(&subs())), vec!["1", "2"]);
        assert_eq!(ids(SubscriptionFilter::new(SubscriptionTab::Expired).apply(&subs())), vec!["3"]);
        assert_eq!(SubscriptionFilter::tab_count(&subs(), SubscriptionTab::Active), 2);
    }

    #[test]
    fn query_matches_platform_or_plan() {
        let filter = SubscriptionFilter::new(SubscriptionTab::Active).with_query("FAMILY");
        assert_eq!(ids(filter.apply(&subs())), vec!["2"]);

        let filter = SubscriptionFilter::new(SubscriptionTab::Active).with_query("net");
        assert_eq!(ids(filter.apply(&subs())), vec!["1"]);
    }

    #[test]
    fn platform_key_is_exact() {
        assert_eq!(subscription_platform_key("Amazon  Prime Video"), "amazon_prime_video");

        let filter = SubscriptionFilter::new(SubscriptionTab::Active).with_platform("youtube_premium");
        assert_eq!(ids(filter.apply(&subs())), vec!["2"]);

        let filter = SubscriptionFilter::new(SubscriptionTab::Active).with_platform("youtube");
        assert!(filter.apply(&subs()).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = SubscriptionFilter::new(SubscriptionTab::Active).with_query("e");
        let once = filter.apply(&subs());
        assert_eq!(filter.apply(&once), once);
    }
}
