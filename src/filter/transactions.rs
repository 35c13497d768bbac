use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::wallet::{TransactionType, WalletTransaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
    Last90Days,
    /// Inclusive calendar dates. Ignored unless both ends are set.
    Custom {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateRange {
    /// Whether a transaction at `at` falls in the range, measured from `now`
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let days = match self {
            Self::All => return true,
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
            Self::Custom {
                from: Some(from),
                to: Some(to),
            } => {
                let day = at.date_naive();
                return day >= *from && day <= *to;
            }
            Self::Custom { .. } => return true,
        };
        at >= now - Duration::days(days)
    }
}

/// Transaction filter state, evaluated against a fixed `now`
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub search: Option<String>,
    pub date_range: DateRange,
    pub now: DateTime<Utc>,
}

impl TransactionFilter {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            kind: None,
            search: None,
            date_range: DateRange::All,
            now,
        }
    }

    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn matches(&self, txn: &WalletTransaction) -> bool {
        if let Some(kind) = self.kind {
            if txn.kind != kind {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let search = search.to_lowercase();
            if !contains_ignore_case(&txn.description, &search)
                && !contains_ignore_case(&txn.id, &search)
            {
                return false;
            }
        }

        if self.date_range == DateRange::All {
            return true;
        }
        match txn.created_at() {
            Some(at) => self.date_range.contains(at, self.now),
            None => false,
        }
    }

    pub fn apply(&self, transactions: &[WalletTransaction]) -> Vec<WalletTransaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}
