//! Auction state derived from the append-only log.
//!
//! Every mutation appends a full `Auction` snapshot. The current state of an
//! auction is the snapshot with the highest sequence number carrying its id.
//! Nothing is cached: each operation reads its answer back from the log.
use log::{info, warn};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;

use crate::domain::{
    validate_auction_id, validate_bid, validate_opening, AmountValue, Auction, AuctionId, Bid,
    ClosedAuction, Errors, RecordKey,
};
use crate::persistence::{AuctionLog, LogError, SeqNo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Append,
    Storage,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] Errors),

    #[error("Failed to append auction record: {0}")]
    Append(#[source] LogError),

    #[error("Failed to read auction log: {0}")]
    Log(#[from] LogError),

    #[error("Undecodable auction record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Domain(Errors::UnknownAuction(_)) => ErrorKind::NotFound,
            LedgerError::Domain(Errors::AuctionAlreadyExists(_)) => ErrorKind::Conflict,
            LedgerError::Domain(_) => ErrorKind::Validation,
            LedgerError::Append(_) => ErrorKind::Append,
            LedgerError::Log(_) | LedgerError::Decode(_) => ErrorKind::Storage,
        }
    }
}

/// The single owner of the auction log.
///
/// `open` and `place_bid` hold a per-auction lock across their
/// find, read and append steps, so two writers on the same auction can never
/// both build on the same snapshot. Different auctions never share a lock.
pub struct Ledger {
    log: Arc<dyn AuctionLog>,
    // Only auctions with an operation in flight have an entry.
    locks: Mutex<HashMap<AuctionId, Arc<AsyncMutex<()>>>>,
}

/// Drops the map entry of an auction once its last user is done, including
/// when the operation future is cancelled.
struct LockLease<'a> {
    ledger: &'a Ledger,
    auction_id: &'a str,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .ledger
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference lives in the map, the other is ours.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(self.auction_id);
        }
    }
}

impl Ledger {
    pub fn new(log: Arc<dyn AuctionLog>) -> Self {
        Ledger {
            log,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, auction_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(auction_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Run `op` while holding the lock of `auction_id`.
    async fn exclusive<T, F>(&self, auction_id: &str, op: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        let lease = LockLease {
            ledger: self,
            auction_id,
            lock: self.lock_for(auction_id),
        };
        let _guard = lease.lock.lock().await;
        op.await
    }

    pub async fn log_length(&self) -> Result<u64, LedgerError> {
        Ok(self.log.length().await?)
    }

    pub async fn open(
        &self,
        auction_id: &str,
        item: &str,
        starting_price: AmountValue,
    ) -> Result<Auction, LedgerError> {
        validate_opening(auction_id, starting_price)?;

        self.exclusive(auction_id, self.open_locked(auction_id, item, starting_price))
            .await
    }

    async fn open_locked(
        &self,
        auction_id: &str,
        item: &str,
        starting_price: AmountValue,
    ) -> Result<Auction, LedgerError> {
        if self.find_latest(auction_id).await?.is_some() {
            return Err(Errors::AuctionAlreadyExists(auction_id.to_string()).into());
        }

        let auction = Auction::new(auction_id, item, starting_price);
        let seq = self.append(&auction).await?;

        info!("Auction opened: {} for {} (seq {})", auction.item, auction.starting_price, seq);
        Ok(auction)
    }

    /// Sequence number of the most recent snapshot of `auction_id`.
    ///
    /// Walks the log from the tail towards 0, so the first match is the latest.
    pub async fn find_latest(&self, auction_id: &str) -> Result<Option<SeqNo>, LedgerError> {
        let mut seq = self.log.length().await?;

        while seq > 0 {
            seq -= 1;
            let record = self.log.get(seq).await?;
            let key: RecordKey = serde_json::from_slice(&record)?;
            if key.auction_id == auction_id {
                return Ok(Some(seq));
            }
        }

        Ok(None)
    }

    pub async fn place_bid(
        &self,
        auction_id: &str,
        bidder: &str,
        amount: AmountValue,
    ) -> Result<Auction, LedgerError> {
        validate_bid(auction_id, bidder, amount)?;

        self.exclusive(auction_id, self.place_bid_locked(auction_id, bidder, amount))
            .await
    }

    async fn place_bid_locked(
        &self,
        auction_id: &str,
        bidder: &str,
        amount: AmountValue,
    ) -> Result<Auction, LedgerError> {
        let current = self.current(auction_id).await?;
        let next = current.with_bid(Bid::new(bidder, amount));
        let seq = self.append(&next).await?;

        info!("Bid placed: {} bids {} on auction {} (seq {})", bidder, amount, auction_id, seq);
        Ok(next)
    }

    /// Winner projection over the latest snapshot. Never writes to the log.
    pub async fn close(&self, auction_id: &str) -> Result<ClosedAuction, LedgerError> {
        validate_auction_id(auction_id)?;

        let closed = ClosedAuction::from_auction(self.current(auction_id).await?);

        match &closed.winner {
            Some(winner) => info!(
                "Auction closed: {} sold to {} for {}",
                closed.auction.item, winner.bidder, winner.amount
            ),
            None => info!("No bids found in auction {}", auction_id),
        }
        Ok(closed)
    }

    /// Latest snapshot of `auction_id`.
    pub async fn current(&self, auction_id: &str) -> Result<Auction, LedgerError> {
        let seq = self
            .find_latest(auction_id)
            .await?
            .ok_or_else(|| Errors::UnknownAuction(auction_id.to_string()))?;
        let record = self.log.get(seq).await?;
        Ok(Auction::from_record(&record)?)
    }

    async fn append(&self, auction: &Auction) -> Result<SeqNo, LedgerError> {
        let record = auction.to_record()?;
        self.log.append(record).await.map_err(|e| {
            warn!("Append for auction {} failed: {}", auction.auction_id, e);
            LedgerError::Append(e)
        })
    }
}
