//! Bid client: talks to one coordinator whose address was obtained out of band.
use async_trait::async_trait;
use log::debug;
use thiserror::Error;

use crate::domain::{validate_auction_id, validate_bid, AmountValue, Auction, ClosedAuction, Errors};
use crate::rpc::{CLOSE_AUCTION, OPEN_AUCTION, PLACE_BID};
use crate::web::types::{
    ApiError, CloseAuctionRequest, OpenAuctionRequest, PlaceBidReply, PlaceBidRequest,
    ServerIdentity,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally, nothing was sent.
    #[error("Invalid request: {0}")]
    Validation(#[from] Errors),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The coordinator answered with an out-of-band failure.
    #[error("Coordinator failed the request ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Request/response channel to the coordinator.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: &str, payload: Vec<u8>) -> Result<Vec<u8>, ClientError>;
}

/// Transport speaking to the coordinator's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    address: String,
}

impl HttpTransport {
    pub fn new(address: impl Into<String>) -> Self {
        HttpTransport {
            http: reqwest::Client::new(),
            address: address.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn identity(&self) -> Result<ServerIdentity, ClientError> {
        let response = self
            .http
            .get(format!("{}/identity", self.address))
            .send()
            .await
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;
        if !status.is_success() {
            return Err(remote_failure(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, payload: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .post(format!("{}/rpc/{}", self.address, method))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(remote_failure(status.as_u16(), &body))
        }
    }
}

fn remote_failure(status: u16, body: &[u8]) -> ClientError {
    let message = match serde_json::from_slice::<ApiError>(body) {
        Ok(err) => err.message,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    ClientError::Remote { status, message }
}

pub struct BidClient<T: Transport> {
    transport: T,
}

impl BidClient<HttpTransport> {
    pub fn connect(address: impl Into<String>) -> Self {
        BidClient::new(HttpTransport::new(address))
    }

    pub async fn identity(&self) -> Result<ServerIdentity, ClientError> {
        self.transport.identity().await
    }
}

impl<T: Transport> BidClient<T> {
    pub fn new(transport: T) -> Self {
        BidClient { transport }
    }

    pub async fn open_auction(
        &self,
        auction_id: &str,
        item: &str,
        price: AmountValue,
    ) -> Result<Auction, ClientError> {
        validate_auction_id(auction_id)?;
        let request = OpenAuctionRequest {
            auction_id: auction_id.to_string(),
            item: item.to_string(),
            price,
        };
        let response = self
            .transport
            .request(OPEN_AUCTION, serde_json::to_vec(&request)?)
            .await?;
        Ok(serde_json::from_slice(&response)?)
    }

    /// Validates locally, then sends the bid.
    ///
    /// A coordinator-side rejection is a successful call returning
    /// `PlaceBidReply::Rejected`; only local validation and transport
    /// problems come back as `Err`.
    pub async fn place_bid(
        &self,
        auction_id: &str,
        bidder: &str,
        amount: AmountValue,
    ) -> Result<PlaceBidReply, ClientError> {
        validate_bid(auction_id, bidder, amount)?;

        let request = PlaceBidRequest {
            auction_id: auction_id.to_string(),
            bidder: bidder.to_string(),
            amount,
        };
        debug!("Sending bid of {} by {} on auction {}", amount, bidder, auction_id);

        let response = self
            .transport
            .request(PLACE_BID, serde_json::to_vec(&request)?)
            .await?;
        Ok(serde_json::from_slice(&response)?)
    }

    pub async fn close_auction(&self, auction_id: &str) -> Result<ClosedAuction, ClientError> {
        validate_auction_id(auction_id)?;
        let request = CloseAuctionRequest {
            auction_id: auction_id.to_string(),
        };
        let response = self
            .transport
            .request(CLOSE_AUCTION, serde_json::to_vec(&request)?)
            .await?;
        Ok(serde_json::from_slice(&response)?)
    }
}
