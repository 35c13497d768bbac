//! Client-side narrowing and ordering of fetched lists
//!
//! Every filter here is a pure function of the input slice and the filter
//! state. Applying a filter to its own output returns the same list.

pub mod plans;
pub mod subscriptions;
pub mod transactions;

pub use plans::{plan_platform_key, PlanFilter, PlanSort, PriceRange};
pub use subscriptions::{subscription_platform_key, SubscriptionFilter, SubscriptionTab};
pub use transactions::{DateRange, TransactionFilter};

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
