use crate::UserId;
use serde::Serialize;

/// What a message is about, for inbox filtering and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    CoinReceived,
    GameInvite,
    GameResult,
}

/// Fire-and-forget message delivery. Best effort: delivery failures are
/// the implementation's problem and never block or fail a settlement.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user: UserId, kind: Kind, title: &str, message: &str, link: &str);
}
