use super::Entry;
use crate::Coins;
use crate::UserId;

/// Transfer failures. InsufficientFunds is an expected outcome at
/// settlement time: the loser may have spent the stake elsewhere between
/// the pre-check and the game's end. Anything else is Rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("user {loser} no longer has enough coins for the stake")]
    InsufficientFunds { loser: UserId },
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Exclusive owner of per-user balances. `transfer` is atomic and
/// serializable per account pair; the caller decides who is loser and
/// winner, and the amount is always positive.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    async fn transfer(
        &self,
        loser: UserId,
        winner: UserId,
        amount: Coins,
    ) -> Result<Entry, TransferError>;

    async fn balance(&self, user: UserId) -> Coins;
}
