use crate::Coins;
use crate::UserId;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

/// One settled stake in the audit log. Exactly one of these exists per
/// completed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub seq: u64,
    pub loser: UserId,
    pub winner: UserId,
    pub amount: Coins,
    pub at: DateTime<Utc>,
}
