#![allow(dead_code)]
use async_trait::async_trait;
use p2p_auction::client::{ClientError, Transport};
use p2p_auction::domain::{Auction, Bid};
use p2p_auction::ledger::Ledger;
use p2p_auction::persistence::InMemoryLog;
use p2p_auction::rpc::AuctionRpc;
use p2p_auction::web::app::error_status;
use std::sync::Arc;
// See https://users.rust-lang.org/t/sharing-code-and-macros-in-tests-directory/3098/7

// Sample data for tests
pub fn sample_auction_id() -> String {
    "1".to_string()
}

pub fn sample_item() -> String {
    "Pic#1".to_string()
}

pub fn sample_price() -> f64 {
    75.0
}

pub fn sample_auction() -> Auction {
    Auction::new(sample_auction_id(), sample_item(), sample_price())
}

pub fn bid_1() -> Bid {
    Bid::new("Client#2", 80.0)
}

pub fn bid_2() -> Bid {
    Bid::new("Client#3", 72.0)
}

pub fn sample_ledger_with_log() -> (Arc<InMemoryLog>, Arc<Ledger>) {
    let log = Arc::new(InMemoryLog::new());
    let ledger = Arc::new(Ledger::new(log.clone()));
    (log, ledger)
}

pub fn sample_ledger() -> Arc<Ledger> {
    sample_ledger_with_log().1
}

/// Ledger holding the sample auction, not yet bid on.
pub async fn ledger_with_sample_auction() -> Arc<Ledger> {
    let ledger = sample_ledger();
    ledger
        .open(&sample_auction_id(), &sample_item(), sample_price())
        .await
        .unwrap();
    ledger
}

/// In-process transport: hands payloads straight to the protocol handlers.
pub struct LocalTransport {
    pub rpc: AuctionRpc,
}

impl LocalTransport {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        LocalTransport {
            rpc: AuctionRpc::new(ledger),
        }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn request(&self, method: &str, payload: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        self.rpc
            .respond(method, &payload)
            .await
            .map_err(|err| ClientError::Remote {
                status: error_status(&err).as_u16(),
                message: err.to_string(),
            })
    }
}
