use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use michi::api::{ApiClient, Auth, ChatSession, FinanceApi};
use michi::cli::{Args, Command};
use michi::config::Config;
use michi::credentials::{CredentialStore, Credentials, FileCredentialStore};
use michi::error::ApiError;
use michi::models::ChatTone;
use michi::ui::output;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    init_tracing(config.verbose);

    if let Err(e) = run(args.command, config).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => output::display_error(api_error),
            None => eprintln!("{} {:#}", "Error:".red(), e),
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "michi=debug" } else { "michi=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn CredentialStore> = match &config.credentials_path {
        Some(path) => Arc::new(FileCredentialStore::new(path)),
        None => Arc::new(FileCredentialStore::in_config_dir()?),
    };
    let credentials = Credentials::new(Arc::clone(&store));
    let api = FinanceApi::new(ApiClient::new(config.client, store)?);

    match command {
        Command::Login {
            token,
            refresh_token,
        } => {
            credentials.save_access_token(&token)?;
            if let Some(refresh_token) = refresh_token {
                credentials.save_refresh_token(&refresh_token)?;
            }
            println!("{}", "Token saved.".green());
        }
        Command::Logout => {
            if credentials.clear_all()? {
                println!("{}", "Logged out.".green());
            } else {
                println!("{}", "No stored tokens.".dimmed());
            }
        }
        Command::Accounts => {
            let accounts = api.accounts().await?;
            let total = michi::models::total_balance(&accounts);
            output::display_accounts(&accounts, total);
        }
        Command::Budgets => output::display_budgets(&api.budgets().await?),
        Command::Transactions => output::display_transactions(&api.recent_transactions().await?),
        Command::Insights => output::display_insights(&api.insights().await?),
        Command::Spending { period } => output::display_spending(&api.spending(period).await?),
        Command::History => output::display_history(&api.chat_history().await?),
        Command::ClearHistory => {
            api.clear_chat_history().await?;
            println!("{}", "Chat history cleared.".green());
        }
        Command::Tone { tone } => {
            api.update_tone(tone).await?;
            println!("Tone set to {}.", tone.display_name().bold());
        }
        Command::Chat {
            tone,
            no_save,
            message,
        } => chat(api, tone.unwrap_or_default(), &message.join(" "), !no_save).await?,
        Command::Get { endpoint, no_auth } => {
            let auth = if no_auth { Auth::Anonymous } else { Auth::Required };
            let value: serde_json::Value = api.client().get(&endpoint, auth).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

async fn chat(api: FinanceApi, tone: ChatTone, message: &str, save: bool) -> anyhow::Result<()> {
    // Earlier turns give the coach context; a missing history is not fatal.
    let history = match api.chat_history().await {
        Ok(history) => history,
        Err(e) => {
            tracing::debug!(error = %e, "starting without chat history");
            Vec::new()
        }
    };
    let mut session = ChatSession::new(api, tone).with_history(history);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut stdout = io::stdout();
    session
        .send(message, Some(cancel.clone()), |chunk| {
            print!("{}", chunk);
            let _ = stdout.flush();
        })
        .await?;
    println!();

    if cancel.is_cancelled() {
        eprintln!("{}", "Interrupted.".dimmed());
        return Ok(());
    }

    if save {
        if let Err(e) = session.save().await {
            eprintln!("{}", format!("Could not save conversation: {}", e).dimmed());
        }
    }
    Ok(())
}
