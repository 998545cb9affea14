use colored::*;

use crate::error::ApiError;
use crate::models::{
    Account, Budget, ChatMessage, Insight, MessageSender, SpendingDataPoint, Transaction,
};

pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Display accounts followed by their combined balance
pub fn display_accounts(accounts: &[Account], total: f64) {
    if accounts.is_empty() {
        println!("{}", "No linked accounts.".dimmed());
        return;
    }
    for account in accounts {
        let balance = account
            .current_balance
            .map(format_amount)
            .unwrap_or_else(|| "n/a".to_string());
        let institution = account.institution.as_deref().unwrap_or("");
        println!(
            "{:<28} {:>14}  {}",
            account.name.bold(),
            balance,
            institution.dimmed()
        );
    }
    println!("{}", "-".repeat(44).dimmed());
    println!("{:<28} {:>14}", "Total".bold(), format_amount(total).green());
}

pub fn display_budgets(budgets: &[Budget]) {
    if budgets.is_empty() {
        println!("{}", "No budgets yet.".dimmed());
        return;
    }
    for budget in budgets {
        let used = budget.percentage_used();
        let percent = format!("{:>5.1}%", used);
        let percent = if used >= 100.0 {
            percent.red()
        } else if used >= 80.0 {
            percent.yellow()
        } else {
            percent.green()
        };
        println!(
            "{:<20} {} spent of {}  {}  ({} left)",
            budget.category.bold(),
            format_amount(budget.spent_amount),
            format_amount(budget.allocated_amount),
            percent,
            format_amount(budget.remaining_amount())
        );
    }
}

pub fn display_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("{}", "No recent transactions.".dimmed());
        return;
    }
    for transaction in transactions {
        let name = transaction
            .merchant_name
            .as_deref()
            .unwrap_or(&transaction.name);
        // Negative amounts are money coming in.
        let amount = if transaction.is_income() {
            format_amount(transaction.amount.abs()).green()
        } else {
            format_amount(-transaction.amount).normal()
        };
        let pending = if transaction.pending { " pending" } else { "" };
        println!(
            "{}  {:<30} {:>12}{}",
            transaction.date.format("%Y-%m-%d").to_string().dimmed(),
            name,
            amount,
            pending.yellow()
        );
    }
}

pub fn display_insights(insights: &[Insight]) {
    if insights.is_empty() {
        println!("{}", "No insights right now.".dimmed());
        return;
    }
    for insight in insights {
        let marker = if insight.actionable { "*" } else { "-" };
        println!("{} {}", marker.cyan(), insight.title.bold());
        println!("  {}", insight.description);
    }
}

pub fn display_spending(points: &[SpendingDataPoint]) {
    if points.is_empty() {
        println!("{}", "No spending recorded for this period.".dimmed());
        return;
    }
    for point in points {
        println!(
            "{}  {:>12}",
            point.date.format("%Y-%m-%d").to_string().dimmed(),
            format_amount(point.amount)
        );
    }
}

pub fn display_history(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("{}", "No saved conversation.".dimmed());
        return;
    }
    for message in messages {
        let who = match message.sender {
            MessageSender::User => "you".cyan().bold(),
            MessageSender::Ai => "coach".green().bold(),
        };
        println!("{}: {}", who, message.content);
    }
}

/// Display an error with a hint for the ones the user can act on
pub fn display_error(error: &ApiError) {
    eprintln!("{} {}", "Error:".red(), error);
    match error {
        ApiError::Unauthorized => {
            eprintln!("{}", "Run `michi login --token <token>` and try again.".dimmed())
        }
        e if e.is_timeout() => eprintln!(
            "{}",
            "The server took too long to answer. Check your connection and retry.".dimmed()
        ),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_puts_sign_before_currency() {
        assert_eq!(format_amount(1234.5), "$1234.50");
        assert_eq!(format_amount(-20.0), "-$20.00");
        assert_eq!(format_amount(0.0), "$0.00");
    }
}
