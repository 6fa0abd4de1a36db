use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::domain::{CapaItem, FinalStatus, ScoreSnapshot, SiteId};

/// Fields covered by the report hash. The struct's field order fixes the
/// canonical JSON encoding, so identical payloads always digest identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHashPayload {
    pub report_version: String,
    pub site_id: SiteId,
    pub final_status: FinalStatus,
    pub score_snapshot: ScoreSnapshot,
    pub capa_items: Vec<CapaItem>,
    pub generated_at: DateTime<Utc>,
}

/// SHA-256 over the canonical JSON encoding, as a lowercase hex string.
pub fn compute_report_hash(payload: &ReportHashPayload) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(payload)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}
