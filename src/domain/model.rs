use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub question: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub options: Vec<PollOption>,
    pub total_votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Uuid,
    pub text: String,
    pub vote_count: i64,
}

/// Status derived from the stored flag and expiry; never stored itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Expired,
    Inactive,
}

impl Poll {
    pub fn status(&self, now: DateTime<Utc>) -> PollStatus {
        if !self.is_active {
            return PollStatus::Inactive;
        }
        match self.expires_at {
            Some(expiry) if expiry <= now => PollStatus::Expired,
            _ => PollStatus::Active,
        }
    }

    /// A poll accepts votes only while its derived status is `Active`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == PollStatus::Active
    }
}
