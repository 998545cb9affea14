use clap::{Parser, Subcommand};

use crate::models::{ChatTone, TimePeriod};

#[derive(Parser, Debug)]
#[command(name = "michi")]
#[command(about = "Command-line client for the Michi personal finance API", long_about = None)]
pub struct Args {
    #[arg(
        long = "base-url",
        global = true,
        help = "API base URL (e.g., http://localhost:8000)"
    )]
    pub base_url: Option<String>,

    #[arg(short = 'v', long = "verbose", global = true, help = "Log requests to stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store the bearer token used for authenticated calls
    Login {
        #[arg(long)]
        token: String,
        #[arg(long = "refresh-token")]
        refresh_token: Option<String>,
    },
    /// Remove every stored token
    Logout,
    /// List linked accounts and the total balance
    Accounts,
    /// Show budgets and how much of each is used
    Budgets,
    /// Show recent transactions
    Transactions,
    /// Show insights computed by the server
    Insights,
    /// Show spending over a period
    Spending {
        #[arg(long, default_value = "month", help = "week, month or year")]
        period: TimePeriod,
    },
    /// Show the saved chat history
    History,
    /// Delete the saved chat history
    ClearHistory,
    /// Set the coach's tone
    Tone {
        #[arg(help = "supportive, direct or neutral")]
        tone: ChatTone,
    },
    /// Ask the financial coach a question; the reply streams as it arrives
    Chat {
        #[arg(long, help = "supportive, direct or neutral")]
        tone: Option<ChatTone>,
        #[arg(long = "no-save", help = "Do not save the exchange to chat history")]
        no_save: bool,
        #[arg(required = true, help = "Message to send")]
        message: Vec<String>,
    },
    /// GET any endpoint and print the raw JSON
    Get {
        endpoint: String,
        #[arg(long = "no-auth", help = "Send the request without the bearer token")]
        no_auth: bool,
    },
}
