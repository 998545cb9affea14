use serde::{Deserialize, Serialize};

/// A linked bank account. The aggregator omits fields it does not know
/// for an institution, so every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub subtype: Option<String>,
    pub current_balance: Option<f64>,
    pub available_balance: Option<f64>,
    pub institution: Option<String>,
}

/// Sum of current balances; accounts without one count as zero.
pub fn total_balance(accounts: &[Account]) -> f64 {
    accounts
        .iter()
        .map(|account| account.current_balance.unwrap_or(0.0))
        .sum()
}
