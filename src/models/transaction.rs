use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

/// Positive amounts are money leaving the account, negative amounts are
/// money coming in (Plaid's sign convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: f64,
    pub name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub date: DateTime<Utc>,
    pub pending: bool,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount < 0.0
    }
}

/// Income and expense totals for transactions dated on or after `since`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CashFlow {
    pub income: f64,
    pub expenses: f64,
}

pub fn cash_flow_since(transactions: &[Transaction], since: DateTime<Utc>) -> CashFlow {
    transactions
        .iter()
        .filter(|t| t.date >= since)
        .fold(CashFlow::default(), |mut flow, t| {
            if t.is_income() {
                flow.income += t.amount.abs();
            } else if t.amount > 0.0 {
                flow.expenses += t.amount;
            }
            flow
        })
}
