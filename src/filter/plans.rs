use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::products::Plan;

/// Lowercase with `+` and whitespace removed, e.g. `disneyhotstar`
pub fn plan_platform_key(platform: &str) -> String {
    platform
        .chars()
        .filter(|c| *c != '+' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Inclusive price bucket, written `min-max` or `min+`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

impl FromStr for PriceRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| Error::config(format!("Invalid price range: {}", s)))
        };

        if let Some(min) = s.strip_suffix('+') {
            return Ok(Self {
                min: parse(min)?,
                max: None,
            });
        }

        match s.split_once('-') {
            Some((min, max)) => Ok(Self {
                min: parse(min)?,
                max: Some(parse(max)?),
            }),
            None => Err(Error::config(format!("Invalid price range: {}", s))),
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanSort {
    /// Server order, unchanged
    #[default]
    Popular,
    PriceLow,
    PriceHigh,
    Savings,
}

impl FromStr for PlanSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "popular" => Ok(Self::Popular),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "savings" => Ok(Self::Savings),
            other => Err(Error::config(format!("Unknown sort order: {}", other))),
        }
    }
}

/// Plan filter state. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanFilter {
    /// Compared against [`plan_platform_key`] of each plan
    pub platform: Option<String>,
    pub duration_months: Option<u32>,
    pub price_range: Option<PriceRange>,
    pub sort: PlanSort,
}

impl PlanFilter {
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_duration(mut self, months: u32) -> Self {
        self.duration_months = Some(months);
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    pub fn with_sort(mut self, sort: PlanSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, plan: &Plan) -> bool {
        if let Some(platform) = &self.platform {
            if plan_platform_key(&plan.platform) != plan_platform_key(platform) {
                return false;
            }
        }
        if let Some(months) = self.duration_months {
            if plan.duration_months != months {
                return false;
            }
        }
        if let Some(range) = &self.price_range {
            if !range.contains(plan.discounted_price) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, plans: &[Plan]) -> Vec<Plan> {
        let mut filtered: Vec<Plan> = plans.iter().filter(|p| self.matches(p)).cloned().collect();

        // sort_by is stable, so ties keep server order
        match self.sort {
            PlanSort::Popular => {}
            PlanSort::PriceLow => filtered.sort_by(|a, b| cmp_f64(a.discounted_price, b.discounted_price)),
            PlanSort::PriceHigh => filtered.sort_by(|a, b| cmp_f64(b.discounted_price, a.discounted_price)),
            PlanSort::Savings => filtered.sort_by(|a, b| cmp_f64(b.savings_percent(), a.savings_percent())),
        }
        filtered
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
