// src/domain/auctions.rs
use serde::{Deserialize, Serialize};
use super::bids::Bid;
use super::core::{validate_auction_id, AmountValue, AuctionId, Errors};

/// Full state of one auction. Every log record holds one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
    pub item: String,
    #[serde(rename = "price")]
    pub starting_price: AmountValue,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

impl Auction {
    pub fn new(auction_id: impl Into<AuctionId>, item: impl Into<String>, starting_price: AmountValue) -> Self {
        Auction {
            auction_id: auction_id.into(),
            item: item.into(),
            starting_price,
            bids: Vec::new(),
        }
    }

    /// Next snapshot: a copy of this one with `bid` appended after the existing bids.
    pub fn with_bid(&self, bid: Bid) -> Auction {
        let mut next = self.clone();
        next.bids.push(bid);
        next
    }

    pub fn to_record(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_record(record: &[u8]) -> Result<Auction, serde_json::Error> {
        serde_json::from_slice(record)
    }
}

/// Partial view used while scanning the log: only the id is decoded.
#[derive(Debug, Deserialize)]
pub struct RecordKey {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
}

pub fn validate_opening(auction_id: &str, starting_price: AmountValue) -> Result<(), Errors> {
    validate_auction_id(auction_id)?;
    if !starting_price.is_finite() {
        return Err(Errors::InvalidPrice);
    }
    Ok(())
}
