use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::ids::{ResetTokenId, StaffId};
use crate::record::Record;

/// How long a reset token stays valid when not configured.
pub const DEFAULT_RESET_TTL_MINUTES: i64 = 30;

/// A one-time password reset token. Only its bcrypt hash is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub id: ResetTokenId,
    pub staff_id: StaffId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub used: bool,
}

impl Record for PasswordReset {
    const COLLECTION: &'static str = "password_resets";

    fn key(&self) -> DocumentId {
        self.id.document_id()
    }
}

impl PasswordReset {
    pub fn new(staff_id: StaffId, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: ResetTokenId::new(),
            staff_id,
            token_hash,
            expires_at,
            used: false,
        }
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}
