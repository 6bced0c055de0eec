use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::board::UserId;

/// The per-profile identity: generated once for a profile and reused
/// across sessions. Ownership checks compare against `id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
}
