mod account;
mod budget;
mod chat;
mod goal;
mod insight;
mod transaction;
mod user;

pub use account::{total_balance, Account};
pub use budget::{Budget, BudgetPeriod};
pub use chat::{ChatMessage, ChatStreamRequest, HistoryTurn, MessageSender, SaveConversation};
pub use goal::{FinancialGoal, GoalCategory};
pub use insight::{Insight, InsightCategory, SpendingDataPoint, TimePeriod};
pub use transaction::{cash_flow_since, CashFlow, Transaction, TransactionType};
pub use user::{ChatTone, ToneUpdate, User, UserPreferences};
