use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Emergency,
    Vacation,
    Purchase,
    DebtPayoff,
    Investment,
    Other,
}

impl GoalCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            GoalCategory::Emergency => "Emergency Fund",
            GoalCategory::Vacation => "Vacation",
            GoalCategory::Purchase => "Major Purchase",
            GoalCategory::DebtPayoff => "Debt Payoff",
            GoalCategory::Investment => "Investment",
            GoalCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[serde(default, with = "crate::api::codec::rfc3339::option")]
    pub target_date: Option<DateTime<Utc>>,
    pub category: GoalCategory,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub created_at: DateTime<Utc>,
}

impl FinancialGoal {
    /// Progress toward the target in percent; 0 when no target is set.
    pub fn progress(&self) -> f64 {
        if self.target_amount > 0.0 {
            self.current_amount / self.target_amount * 100.0
        } else {
            0.0
        }
    }
}
