//! Append-only record log backing the ledger.
//!
//! Records are opaque bytes. Sequence numbers start at 0, are assigned in
//! append order and never change.
pub mod in_memory;
pub mod json_file;

use async_trait::async_trait;
use thiserror::Error;

pub use self::in_memory::InMemoryLog;
pub use self::json_file::JsonFileLog;

pub type SeqNo = u64;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode log entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt log: {0}")]
    Corrupt(String),

    #[error("No record at sequence number {0}")]
    OutOfRange(SeqNo),

    #[error("Log refuses appends after a failed rollback")]
    Poisoned,

    #[error("Append rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait AuctionLog: Send + Sync {
    /// Append a record. The record is durable once this returns.
    async fn append(&self, record: Vec<u8>) -> Result<SeqNo, LogError>;

    async fn get(&self, seq: SeqNo) -> Result<Vec<u8>, LogError>;

    async fn length(&self) -> Result<u64, LogError>;
}
