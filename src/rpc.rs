//! Server side of the bid protocol, independent of the transport.
//!
//! Each operation takes an opaque request payload and produces a response
//! payload. `openAuction` and `closeAuction` fail out-of-band with an
//! `RpcError`; `placeBid` never fails and reports problems in its reply.
use log::{debug, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::Errors;
use crate::ledger::{ErrorKind, Ledger, LedgerError};
use crate::web::types::{CloseAuctionRequest, OpenAuctionRequest, PlaceBidReply, PlaceBidRequest};

pub const OPEN_AUCTION: &str = "openAuction";
pub const PLACE_BID: &str = "placeBid";
pub const CLOSE_AUCTION: &str = "closeAuction";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<Errors> for RpcError {
    fn from(err: Errors) -> Self {
        RpcError::Ledger(LedgerError::Domain(err))
    }
}

impl RpcError {
    /// `None` for failures that are not about the auction domain at all.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RpcError::Ledger(err) => Some(err.kind()),
            RpcError::UnknownMethod(_) | RpcError::Encode(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct AuctionRpc {
    ledger: Arc<Ledger>,
}

impl AuctionRpc {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        AuctionRpc { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Route a named request to its handler.
    pub async fn respond(&self, method: &str, request: &[u8]) -> Result<Vec<u8>, RpcError> {
        debug!("Handling {} ({} bytes)", method, request.len());
        match method {
            OPEN_AUCTION => self.open_auction(request).await,
            PLACE_BID => Ok(self.place_bid(request).await),
            CLOSE_AUCTION => self.close_auction(request).await,
            other => Err(RpcError::UnknownMethod(other.to_string())),
        }
    }

    pub async fn open_auction(&self, request: &[u8]) -> Result<Vec<u8>, RpcError> {
        let req: OpenAuctionRequest =
            serde_json::from_slice(request).map_err(|e| Errors::MalformedRequest(e.to_string()))?;
        let auction = self.ledger.open(&req.auction_id, &req.item, req.price).await?;
        serde_json::to_vec(&auction).map_err(RpcError::Encode)
    }

    pub async fn place_bid(&self, request: &[u8]) -> Vec<u8> {
        let reply = match self.try_place_bid(request).await {
            Ok(()) => PlaceBidReply::placed(),
            Err(err) => {
                warn!("Error while handling bid request: {}", err);
                PlaceBidReply::rejected(err)
            }
        };
        encode_reply(&reply)
    }

    async fn try_place_bid(&self, request: &[u8]) -> Result<(), LedgerError> {
        let req = PlaceBidRequest::from_payload(request)?;
        self.ledger.place_bid(&req.auction_id, &req.bidder, req.amount).await?;
        Ok(())
    }

    pub async fn close_auction(&self, request: &[u8]) -> Result<Vec<u8>, RpcError> {
        let req: CloseAuctionRequest =
            serde_json::from_slice(request).map_err(|e| Errors::MalformedRequest(e.to_string()))?;
        let closed = self.ledger.close(&req.auction_id).await?;
        serde_json::to_vec(&closed).map_err(RpcError::Encode)
    }
}

fn encode_reply(reply: &PlaceBidReply) -> Vec<u8> {
    // A reply holds two strings at most; encoding cannot fail.
    serde_json::to_vec(reply).unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec())
}
