use std::{path::Path, time::Duration};

use cashlet_wallet::{
    connector::http::HttpMintConnector, localstore::sqlite::SqliteLocalStore, wallet::Wallet,
};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use num_format::{Locale, ToFormattedString};
use qrcode::{render::unicode, QrCode};

pub type CliWallet = Wallet<SqliteLocalStore, HttpMintConnector>;

pub fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    Ok(pb)
}

/// Database path inside `db_dir`, or the default path of the wallet.
pub fn db_path(db_dir: Option<&Path>) -> anyhow::Result<String> {
    Ok(match db_dir {
        Some(dir) => cashlet_wallet::config_path::db_path_in(dir)?,
        None => cashlet_wallet::config_path::db_path()?,
    })
}

pub fn format_amount(amount: u64) -> String {
    amount.to_formatted_string(&Locale::en)
}

pub fn qr_code(data: &str) -> anyhow::Result<String> {
    Ok(QrCode::new(data)?
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .build())
}

pub async fn show_total_balance(wallet: &CliWallet) -> anyhow::Result<()> {
    let term = Term::stdout();
    term.write_line(&format!(
        "New total balance {} ({})",
        style(format_amount(wallet.balance().await)).cyan(),
        wallet.unit()
    ))?;
    Ok(())
}
