use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::integration::Provider;
use crate::domain::types::{SyncRunId, TenantId, text_enum};

text_enum! {
    SyncStatus {
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
    }
}

/// One recorded execution of a third-party sync.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyncRun {
    pub id: SyncRunId,
    pub tenant_id: TenantId,
    pub provider: Provider,
    pub status: SyncStatus,
    pub records: i32,
    pub error: Option<String>,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
}

/// Terminal state of a sync run.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncOutcome {
    Succeeded { records: i32 },
    Failed { records: i32, error: String },
}

impl SyncOutcome {
    pub fn status(&self) -> SyncStatus {
        match self {
            SyncOutcome::Succeeded { .. } => SyncStatus::Succeeded,
            SyncOutcome::Failed { .. } => SyncStatus::Failed,
        }
    }

    pub fn records(&self) -> i32 {
        match self {
            SyncOutcome::Succeeded { records } | SyncOutcome::Failed { records, .. } => *records,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SyncOutcome::Succeeded { .. } => None,
            SyncOutcome::Failed { error, .. } => Some(error),
        }
    }
}
