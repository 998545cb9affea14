use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Spending,
    Saving,
    Budget,
    Goal,
    Warning,
}

/// Server-computed observation about the user's finances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    #[serde(default)]
    pub actionable: bool,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingDataPoint {
    #[serde(with = "crate::api::codec::rfc3339")]
    pub date: DateTime<Utc>,
    pub amount: f64,
}

/// Window for `/analytics/spending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl TimePeriod {
    pub fn as_query(&self) -> &'static str {
        match self {
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
            TimePeriod::Year => "year",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for TimePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(TimePeriod::Week),
            "month" => Ok(TimePeriod::Month),
            "year" => Ok(TimePeriod::Year),
            other => Err(format!("unknown period `{}` (expected week, month or year)", other)),
        }
    }
}
