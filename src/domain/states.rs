// src/domain/states.rs
use serde::{Deserialize, Serialize};
use super::auctions::Auction;
use super::bids::Bid;

/// Result of closing an auction.
///
/// `auction.bids` is sorted ascending by amount (`f64::total_cmp`, so `-0.0`
/// ranks below `0.0`) with ties ordered so that the earliest bid comes last.
/// `winner` is that last bid: highest amount, first placed among equals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedAuction {
    #[serde(flatten)]
    pub auction: Auction,
    pub winner: Option<Bid>,
}

impl ClosedAuction {
    pub fn from_auction(auction: Auction) -> Self {
        let mut ranked: Vec<(usize, Bid)> = auction.bids.iter().cloned().enumerate().collect();
        ranked.sort_by(|(ia, a), (ib, b)| a.amount.total_cmp(&b.amount).then(ib.cmp(ia)));

        let bids: Vec<Bid> = ranked.into_iter().map(|(_, bid)| bid).collect();
        let winner = bids.last().cloned();

        ClosedAuction {
            auction: Auction { bids, ..auction },
            winner,
        }
    }

    pub fn has_bids(&self) -> bool {
        self.winner.is_some()
    }
}
