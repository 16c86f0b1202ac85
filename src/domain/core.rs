// src/domain/core.rs
use thiserror::Error;

pub type AuctionId = String;
pub type BidderId = String;
pub type AmountValue = f64;

/// Rule violations and lookup failures of the auction domain.
///
/// The `Display` text is what travels to remote callers, either as the
/// in-band `error` field of a `placeBid` reply or as the `message` of an
/// out-of-band failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Errors {
    #[error("Invalid auctionId")]
    InvalidAuctionId,

    #[error("Invalid bidder")]
    InvalidBidder,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Auction not found")]
    UnknownAuction(AuctionId),

    #[error("Auction already exists: {0}")]
    AuctionAlreadyExists(AuctionId),
}

pub fn validate_auction_id(auction_id: &str) -> Result<(), Errors> {
    if auction_id.is_empty() {
        return Err(Errors::InvalidAuctionId);
    }
    Ok(())
}
