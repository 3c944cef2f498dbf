use serde::{Deserialize, Serialize};

use crate::domain::sync::SyncRun;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct SyncHistoryQuery {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

pub struct SyncHistoryData {
    pub runs: Paginated<SyncRun>,
    pub provider: Option<String>,
}

/// Counts reported after a batch enrichment.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct EnrichmentSummary {
    pub enriched: usize,
    pub failed: usize,
}
