// src/lib.rs
pub mod client;
pub mod config;
pub mod domain;
pub mod ledger;
pub mod persistence;
pub mod rpc;
pub mod web;

pub use domain::{Auction, Bid, ClosedAuction, Errors};
pub use ledger::{Ledger, LedgerError};
pub use web::app::run_app;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Failed to open auction log: {0}")]
    Log(#[from] persistence::LogError),

    #[error("Server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Install `env_logger`, honouring `RUST_LOG` when it is set.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or(config::DEFAULT_LOG_FILTER);
    let _ = env_logger::Builder::from_env(env).try_init();
}
