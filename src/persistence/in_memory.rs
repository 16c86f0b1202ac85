use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{AuctionLog, LogError, SeqNo};

/// Fake in-memory log.
///
/// Useful for unit-tests.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    records: RwLock<Vec<Vec<u8>>>,
    fail_appends: AtomicBool,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following append fail, to exercise the append-failure path.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuctionLog for InMemoryLog {
    async fn append(&self, record: Vec<u8>) -> Result<SeqNo, LogError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(LogError::Rejected("appends disabled".to_string()));
        }
        let mut records = self.records.write().await;
        records.push(record);
        Ok((records.len() - 1) as SeqNo)
    }

    async fn get(&self, seq: SeqNo) -> Result<Vec<u8>, LogError> {
        let records = self.records.read().await;
        usize::try_from(seq)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or(LogError::OutOfRange(seq))
    }

    async fn length(&self) -> Result<u64, LogError> {
        Ok(self.records.read().await.len() as u64)
    }
}
