use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{from_str, to_string};
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use super::{AuctionLog, LogError, SeqNo};

/// One line of the log file.
#[derive(Debug, Serialize, Deserialize)]
struct LogLine {
    seq: SeqNo,
    #[serde(rename = "appendedAt")]
    appended_at: DateTime<Utc>,
    payload: String,
}

/// Destination of log lines: the log file, opened in append mode.
#[async_trait]
trait LineSink: Send + Sync + fmt::Debug {
    async fn size(&mut self) -> io::Result<u64>;

    /// Write `line` and flush it to disk.
    async fn write_line(&mut self, line: &[u8]) -> io::Result<()>;

    async fn truncate(&mut self, size: u64) -> io::Result<()>;
}

#[async_trait]
impl LineSink for File {
    async fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata().await?.len())
    }

    async fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.write_all(line).await?;
        self.sync_data().await
    }

    async fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.set_len(size).await?;
        self.sync_data().await
    }
}

/// Log kept as a JSON-lines file, one record per line.
///
/// The whole file is replayed into memory on open; reads are served from
/// memory and every append is flushed to disk before it returns. A failed
/// append is cut back off the file. If that cut fails too, the log refuses
/// all further appends.
#[derive(Debug)]
pub struct JsonFileLog {
    sink: Mutex<Box<dyn LineSink>>,
    records: RwLock<Vec<Vec<u8>>>,
    poisoned: AtomicBool,
}

impl JsonFileLog {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let (records, file) = load(path.as_ref()).await?;
        Ok(Self::from_parts(records, Box::new(file)))
    }

    fn from_parts(records: Vec<Vec<u8>>, sink: Box<dyn LineSink>) -> Self {
        JsonFileLog {
            sink: Mutex::new(sink),
            records: RwLock::new(records),
            poisoned: AtomicBool::new(false),
        }
    }
}

async fn load(path: &Path) -> Result<(Vec<Vec<u8>>, File), LogError> {
    let records = match tokio::fs::read_to_string(path).await {
        Ok(text) => read_records(&text)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let file = OpenOptions::new().create(true).append(true).open(path).await?;
    info!("Opened log {} with {} records", path.display(), records.len());

    Ok((records, file))
}

fn read_records(text: &str) -> Result<Vec<Vec<u8>>, LogError> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: LogLine = from_str(line)?;
        if parsed.seq != records.len() as SeqNo {
            return Err(LogError::Corrupt(format!(
                "line {} holds seq {}, expected {}",
                index + 1,
                parsed.seq,
                records.len()
            )));
        }
        let payload = general_purpose::STANDARD
            .decode(&parsed.payload)
            .map_err(|e| LogError::Corrupt(format!("line {}: {}", index + 1, e)))?;
        records.push(payload);
    }

    Ok(records)
}

#[async_trait]
impl AuctionLog for JsonFileLog {
    async fn append(&self, record: Vec<u8>) -> Result<SeqNo, LogError> {
        // Holding the sink lock keeps line order and sequence numbers in step.
        let mut sink = self.sink.lock().await;
        if self.poisoned.load(Ordering::SeqCst) {
            return Err(LogError::Poisoned);
        }
        let seq = self.records.read().await.len() as SeqNo;

        let line = LogLine {
            seq,
            appended_at: Utc::now(),
            payload: general_purpose::STANDARD.encode(&record),
        };
        let mut json = to_string(&line)?;
        json.push('\n');

        let size = sink.size().await?;
        if let Err(e) = sink.write_line(json.as_bytes()).await {
            warn!("Append of seq {} failed, cutting the log back to {} bytes: {}", seq, size, e);
            if let Err(cut) = sink.truncate(size).await {
                error!("Could not cut back the log, refusing further appends: {}", cut);
                self.poisoned.store(true, Ordering::SeqCst);
            }
            return Err(e.into());
        }

        self.records.write().await.push(record);
        Ok(seq)
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
