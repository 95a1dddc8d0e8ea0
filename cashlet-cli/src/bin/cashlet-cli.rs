use std::{path::PathBuf, time::Duration};

use cashlet_core::primitives::CurrencyUnit;
use cashlet_wallet::{
    config::PollConfig, connector::http::HttpMintConnector, error::WalletError,
    localstore::sqlite::SqliteLocalStore, poll::PollHandle, wallet::Wallet,
};
use cashletcli::cli::{self, format_amount};
use clap::{Parser, Subcommand};
use console::{style, Term};
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(arg_required_else_help(true))]
struct Opts {
    /// Directory of the wallet database
    #[clap(short, long, env = "CASHLET_DB_DIR")]
    db_dir: Option<PathBuf>,

    #[clap(short, long, env = "CASHLET_UNIT", default_value = "sat")]
    unit: CurrencyUnit,

    /// Seconds between two checks of a mint quote
    #[clap(long, env = "CASHLET_POLL_INTERVAL_SECS", default_value_t = 5)]
    poll_interval: u64,

    /// Stop checking a mint quote after this many attempts
    #[clap(long, env = "CASHLET_MAX_POLL_ATTEMPTS")]
    max_poll_attempts: Option<u32>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Connect the wallet to a mint
    ConnectMint { url: Url },

    /// Mint tokens
    Mint { amount: u64 },

    /// Pay Lightning invoice
    Pay { invoice: String },

    /// Send tokens
    Send { amount: u64 },

    /// Receive tokens
    Receive { token: String },

    /// Show local balance
    Balance,

    /// Show version and configuration
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Opts::parse();
    let db_path = cli::db_path(cli.db_dir.as_deref())?;
    debug!("using database {db_path}");

    let term = Term::stdout();
    let localstore = SqliteLocalStore::with_path(db_path.clone()).await?;
    let wallet: cli::CliWallet = Wallet::builder()
        .with_localstore(localstore)
        .with_connector(HttpMintConnector::default())
        .with_unit(cli.unit.clone())
        .with_poll_config(PollConfig::new(
            Duration::from_secs(cli.poll_interval),
            cli.max_poll_attempts,
        ))
        .build()
        .await?;

    if !matches!(cli.command, Command::ConnectMint { .. } | Command::Info)
        && wallet.session().await.is_none()
    {
        term.write_line("No mint connected. Connect a mint first with 'cashlet-cli connect-mint <url>'")?;
        return Ok(());
    }

    match cli.command {
        Command::ConnectMint { url } => {
            let info = wallet.connect_mint(url.clone()).await?;
            let name = info.name.unwrap_or_else(|| url.to_string());
            term.write_line(&format!("Connected to mint {}", style(name).cyan()))?;
            if let Some(motd) = info.motd {
                term.write_line(&format!("Message of the day: {motd}"))?;
            }
        }
        Command::Info => {
            let wallet_version = style(env!("CARGO_PKG_VERSION")).cyan();
            let db_path = style(db_path).cyan();
            term.write_line(&format!("Version: {wallet_version}"))?;
            term.write_line(&format!("DB: {db_path}"))?;
            term.write_line(&format!("Unit: {}", wallet.unit()))?;

            match wallet.session().await {
                Some(session) => {
                    term.write_line(&format!("Mint: {}", session.mint_url))?;
                    term.write_line(&format!("Keyset: {}", session.keyset.id))?;
                }
                None => term.write_line("No mint connected.")?,
            }
        }
        Command::Balance => {
            let balance = wallet.balance().await;
            term.write_line(&format!(
                "Balance: {} ({}) in {} proofs",
                style(format_amount(balance)).cyan(),
                wallet.unit(),
                wallet.proofs().await.len()
            ))?;
        }
        Command::Mint { amount } => {
            let quote = wallet.get_mint_quote(amount).await?;

            term.write_line(&format!(
                "Pay lightning invoice to mint tokens:\n\n{}",
                quote.payment_request
            ))?;
            term.write_line(&cli::qr_code(&quote.payment_request)?)?;

            let poll = PollHandle::new();
            let cancel = poll.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            let progress_bar = cli::progress_bar()?;
            progress_bar.set_message("Waiting for payment ...");

            match wallet.mint_tokens(&quote, &poll).await {
                Ok(proofs) => {
                    progress_bar.finish_with_message(format!(
                        "Minted {} ({}) successfully.\n",
                        format_amount(proofs.total_amount()),
                        wallet.unit()
                    ));
                    cli::show_total_balance(&wallet).await?;
                }
                Err(WalletError::PollCancelled) => {
                    progress_bar.finish_with_message(format!(
                        "Cancelled. Quote {} can be paid later.",
                        quote.quote
                    ));
                }
                Err(e) => {
                    progress_bar.abandon();
                    return Err(e.into());
                }
            }
        }
        Command::Pay { invoice } => match wallet.melt(&invoice).await {
            Ok(result) => {
                term.write_line("Invoice has been paid: Tokens melted successfully")?;
                if !result.change.is_empty() {
                    term.write_line(&format!(
                        "Returned fees {} ({})",
                        format_amount(result.change.total_amount()),
                        wallet.unit()
                    ))?;
                }
                if let Some(preimage) = result.preimage {
                    term.write_line(&format!("Preimage: {preimage}"))?;
                }
                cli::show_total_balance(&wallet).await?;
            }
            Err(WalletError::InsufficientBalance {
                required,
                available,
            }) => {
                term.write_line(&format!(
                    "Error: Not enough tokens. Required {} but only {} available",
                    format_amount(required),
                    format_amount(available)
                ))?;
            }
            Err(e) => return Err(e.into()),
        },
        Command::Send { amount } => match wallet.swap_send(amount).await {
            Ok(token) => {
                term.write_line(&format!("Result {amount} ({}):\n{token}", wallet.unit()))?;
                cli::show_total_balance(&wallet).await?;
            }
            Err(WalletError::InsufficientBalance { available, .. }) => {
                term.write_line(&format!(
                    "Error: Not enough tokens. Balance is {} ({})",
                    format_amount(available),
                    wallet.unit()
                ))?;
            }
            Err(e) => return Err(e.into()),
        },
        Command::Receive { token } => match wallet.swap_claim(&token).await {
            Ok(proofs) => {
                term.write_line(&format!(
                    "Received {} ({}) successfully.",
                    format_amount(proofs.total_amount()),
                    wallet.unit()
                ))?;
                cli::show_total_balance(&wallet).await?;
            }
            Err(WalletError::PartialFailure { redeemed, failed }) => {
                term.write_line(&format!(
                    "Received {} ({}), {} ({}) could not be redeemed and were dropped.",
                    format_amount(redeemed.total_amount()),
                    wallet.unit(),
                    format_amount(failed.total_amount()),
                    wallet.unit()
                ))?;
                cli::show_total_balance(&wallet).await?;
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}
