//! Audit trail of answered questions
//!
//! Every resolution is kept together with the fingerprint of the dataset
//! snapshot it was computed against. Records accumulate until drained, so
//! long-lived callers should call `drain` periodically.

use crate::models::{HoldingRecord, Resolution, TradeRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One answered question
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionRecord {
    pub audit_id: Uuid,
    pub question: String,
    pub resolution: Resolution,
    pub dataset_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

/// In-memory audit trail storage
pub struct AuditLog {
    records: Arc<RwLock<HashMap<Uuid, ResolutionRecord>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store a resolution record
    pub async fn record(&self, record: ResolutionRecord) -> Uuid {
        let audit_id = record.audit_id;
        let mut records = self.records.write().await;
        records.insert(audit_id, record);
        audit_id
    }

    /// Retrieve a record by audit ID
    pub async fn get(&self, audit_id: Uuid) -> Option<ResolutionRecord> {
        let records = self.records.read().await;
        records.get(&audit_id).cloned()
    }

    /// All records, oldest first
    pub async fn list(&self) -> Vec<ResolutionRecord> {
        let records = self.records.read().await;

        let mut items: Vec<_> = records.values().cloned().collect();
        items.sort_by_key(|record| record.created_at);
        items
    }

    /// Remove and return all records, oldest first
    pub async fn drain(&self) -> Vec<ResolutionRecord> {
        let mut records = self.records.write().await;

        let mut items: Vec<_> = records.drain().map(|(_, record)| record).collect();
        items.sort_by_key(|record| record.created_at);
        items
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Whether a record was computed against the given dataset snapshot
    pub async fn matches_snapshot(&self, audit_id: Uuid, fingerprint: &str) -> bool {
        let records = self.records.read().await;

        records
            .get(&audit_id)
            .map(|record| record.dataset_fingerprint == fingerprint)
            .unwrap_or(false)
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the SHA256 fingerprint of both tables
/// Streams JSON rows straight into the hasher
pub fn compute_dataset_fingerprint(holdings: &[HoldingRecord], trades: &[TradeRecord]) -> String {
    let mut hasher = Sha256::new();

    {
        let mut writer = HashWriter(&mut hasher);
        if serde_json::to_writer(&mut writer, holdings).is_err() {
            return String::new();
        }
        // Separator keeps rows from one table from aliasing into the other.
        if writer.write_all(b"\x1e").is_err() {
            return String::new();
        }
        if serde_json::to_writer(&mut writer, trades).is_err() {
            return String::new();
        }
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
