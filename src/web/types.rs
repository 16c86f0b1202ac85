use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{AmountValue, AuctionId, BidderId, Errors};
use crate::rpc::AuctionRpc;

pub const BID_PLACED: &str = "Bid placed successfully";

pub struct AppState {
    pub rpc: AuctionRpc,
    pub identity: ServerIdentity,
}

/// Body of every out-of-band failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

/// Public identity of a coordinator, handed to bidders out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIdentity {
    #[serde(rename = "nodeId")]
    pub node_id: Uuid,
    pub address: String,
}

impl ServerIdentity {
    pub fn generate(address: impl Into<String>) -> Self {
        ServerIdentity {
            node_id: Uuid::new_v4(),
            address: address.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAuctionRequest {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
    pub item: String,
    pub price: AmountValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CloseAuctionRequest {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceBidRequest {
    #[serde(rename = "auctionId")]
    pub auction_id: AuctionId,
    pub bidder: BidderId,
    pub amount: AmountValue,
}

impl PlaceBidRequest {
    /// Field by field decoding, so a bad field reports the same error the
    /// ledger's own validation would.
    pub fn from_payload(payload: &[u8]) -> Result<Self, Errors> {
        let json: Value =
            serde_json::from_slice(payload).map_err(|e| Errors::MalformedRequest(e.to_string()))?;

        let auction_id = match json.get("auctionId").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(Errors::InvalidAuctionId),
        };
        let bidder = match json.get("bidder").and_then(Value::as_str) {
            Some(bidder) if !bidder.is_empty() => bidder.to_string(),
            _ => return Err(Errors::InvalidBidder),
        };
        let amount = json
            .get("amount")
            .and_then(Value::as_f64)
            .ok_or(Errors::InvalidAmount)?;

        Ok(PlaceBidRequest {
            auction_id,
            bidder,
            amount,
        })
    }
}

/// `placeBid` answer. Failures travel in-band as `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceBidReply {
    Placed { status: String },
    Rejected { error: String },
}

impl PlaceBidReply {
    pub fn placed() -> Self {
        PlaceBidReply::Placed {
            status: BID_PLACED.to_string(),
        }
    }

    pub fn rejected(error: impl ToString) -> Self {
        PlaceBidReply::Rejected {
            error: error.to_string(),
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, PlaceBidReply::Placed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PlaceBidReply::Rejected { error } => Some(error),
            PlaceBidReply::Placed { .. } => None,
        }
    }
}
