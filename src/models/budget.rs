use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub allocated_amount: f64,
    pub spent_amount: f64,
    pub period: BudgetPeriod,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub end_date: DateTime<Utc>,
}

impl Budget {
    pub fn remaining_amount(&self) -> f64 {
        self.allocated_amount - self.spent_amount
    }

    /// Percentage of the allocation already spent; 0 for an empty budget.
    pub fn percentage_used(&self) -> f64 {
        if self.allocated_amount > 0.0 {
            self.spent_amount / self.allocated_amount * 100.0
        } else {
            0.0
        }
    }
}
