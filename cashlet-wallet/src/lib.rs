pub mod client;
pub mod config;
pub mod config_path;
pub mod connector;
pub mod error;
pub mod http;
pub mod localstore;
pub mod poll;
pub mod proofstore;
pub mod session;
pub mod wallet;
