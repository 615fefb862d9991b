use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NlpSourceType;

/// Output of the external NLP pipeline for one remark or feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpResult {
    pub id: Uuid,
    pub source_type: NlpSourceType,
    pub remark_id: Option<Uuid>,
    pub feedback_id: Option<Uuid>,
    /// Opaque processed payload (sentiment, extracted keywords, ...).
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl NlpResult {
    pub fn source_id(&self) -> Option<Uuid> {
        match self.source_type {
            NlpSourceType::Remark => self.remark_id,
            NlpSourceType::Feedback => self.feedback_id,
        }
    }
}
