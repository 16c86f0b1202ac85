// src/domain/bids.rs
use serde::{Deserialize, Serialize};
use super::core::{validate_auction_id, AmountValue, BidderId, Errors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: BidderId,
    pub amount: AmountValue,
}

impl Bid {
    pub fn new(bidder: impl Into<BidderId>, amount: AmountValue) -> Self {
        Bid {
            bidder: bidder.into(),
            amount,
        }
    }
}

pub fn validate_bidder(bidder: &str) -> Result<(), Errors> {
    if bidder.is_empty() {
        return Err(Errors::InvalidBidder);
    }
    Ok(())
}

pub fn validate_amount(amount: AmountValue) -> Result<(), Errors> {
    if !amount.is_finite() {
        return Err(Errors::InvalidAmount);
    }
    Ok(())
}

/// Rules shared by the coordinator and the bid client, checked in this order.
pub fn validate_bid(auction_id: &str, bidder: &str, amount: AmountValue) -> Result<(), Errors> {
    validate_auction_id(auction_id)?;
    validate_bidder(bidder)?;
    validate_amount(amount)
}
