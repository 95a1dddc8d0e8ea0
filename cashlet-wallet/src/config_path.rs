use dirs::home_dir;
use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use crate::error::WalletError;

pub const ENV_DB_PATH: &str = "WALLET_DB_PATH";

const WALLET_DIR: &str = ".cashlet";
const DB_FILE: &str = "wallet.db";

/// Returns the path to the wallet database file.
///
/// The path is the value of the `WALLET_DB_PATH` environment variable. If the variable is not set,
/// a `.cashlet` directory is created in the home directory of the user and the path of
/// `wallet.db` in that directory is returned.
///
/// # Examples
///
/// ```
/// let db_path = cashlet_wallet::config_path::db_path().expect("no home dir");
/// println!("Database path: {}", db_path);
/// ```
pub fn db_path() -> Result<String, WalletError> {
    match std::env::var(ENV_DB_PATH) {
        Ok(path) => Ok(path),
        Err(_) => db_path_in(&config_dir()?),
    }
}

/// Path of the database file in `dir`, the directory is created if it doesn't exist.
pub fn db_path_in(dir: &Path) -> Result<String, WalletError> {
    if !dir.exists() {
        create_dir_all(dir)?;
    }
    Ok(dir.join(DB_FILE).to_string_lossy().into_owned())
}

pub fn config_dir() -> Result<PathBuf, WalletError> {
    let home = home_dir().ok_or(WalletError::HomeDirNotFound)?;
    Ok(home.join(WALLET_DIR))
}
