use super::Entry;
use super::Ledger;
use super::TransferError;
use crate::Coins;
use crate::UserId;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

/// In-process ledger. Each account is its own lock; a transfer takes the
/// two account locks in ascending id order, which keeps concurrent
/// settlements between overlapping users deadlock free. Accounts open
/// lazily with the configured opening balance.
pub struct Bank {
    accounts: RwLock<HashMap<UserId, Arc<Mutex<Coins>>>>,
    audit: Mutex<Vec<Entry>>,
    count: AtomicU64,
    opening: Coins,
}

impl Bank {
    pub fn new(opening: Coins) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            audit: Mutex::new(Vec::new()),
            count: AtomicU64::new(1),
            opening,
        }
    }

    /// Sets a balance outright, bypassing the audit log. The admin mint
    /// path, and the test seam.
    pub async fn open(&self, user: UserId, coins: Coins) {
        let account = self.account(user).await;
        *account.lock().await = coins;
    }

    /// Snapshot of the settlement history.
    pub async fn audit(&self) -> Vec<Entry> {
        self.audit.lock().await.clone()
    }

    async fn account(&self, user: UserId) -> Arc<Mutex<Coins>> {
        if let Some(account) = self.accounts.read().await.get(&user) {
            return account.clone();
        }
        self.accounts
            .write()
            .await
            .entry(user)
            .or_insert_with(|| Arc::new(Mutex::new(self.opening)))
            .clone()
    }
}

#[async_trait::async_trait]
impl Ledger for Bank {
    async fn transfer(
        &self,
        loser: UserId,
        winner: UserId,
        amount: Coins,
    ) -> Result<Entry, TransferError> {
        if loser == winner {
            return Err(TransferError::Rejected(
                "cannot transfer coins to yourself".to_string(),
            ));
        }
        if amount == 0 {
            return Err(TransferError::Rejected(
                "amount must be positive".to_string(),
            ));
        }
        let a = self.account(loser.min(winner)).await;
        let b = self.account(loser.max(winner)).await;
        let mut lo = a.lock().await;
        let mut hi = b.lock().await;
        let (loser_balance, winner_balance) = if loser < winner {
            (&mut *lo, &mut *hi)
        } else {
            (&mut *hi, &mut *lo)
        };
        if *loser_balance < amount {
            return Err(TransferError::InsufficientFunds { loser });
        }
        *loser_balance -= amount;
        *winner_balance += amount;
        let entry = Entry {
            seq: self.count.fetch_add(1, Ordering::Relaxed),
            loser,
            winner,
            amount,
            at: Utc::now(),
        };
        self.audit.lock().await.push(entry);
        log::info!(
            "settled: winner={} loser={} amount={}",
            winner,
            loser,
            amount
        );
        Ok(entry)
    }

    async fn balance(&self, user: UserId) -> Coins {
        *self.account(user).await.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transfer_moves_the_stake_once() {
        let bank = Bank::new(100);
        let entry = bank.transfer(1, 2, 40).await.unwrap();
        assert!(bank.balance(1).await == 60);
        assert!(bank.balance(2).await == 140);
        let audit = bank.audit().await;
        assert!(audit.len() == 1);
        assert!(audit[0] == entry);
    }

    #[tokio::test]
    async fn insufficient_funds_moves_nothing() {
        let bank = Bank::new(10);
        let result = bank.transfer(1, 2, 40).await;
        assert!(result == Err(TransferError::InsufficientFunds { loser: 1 }));
        assert!(bank.balance(1).await == 10);
        assert!(bank.balance(2).await == 10);
        assert!(bank.audit().await.is_empty());
    }

    #[tokio::test]
    async fn self_and_zero_transfers_rejected() {
        let bank = Bank::new(100);
        assert!(matches!(
            bank.transfer(1, 1, 40).await,
            Err(TransferError::Rejected(_))
        ));
        assert!(matches!(
            bank.transfer(1, 2, 0).await,
            Err(TransferError::Rejected(_))
        ));
        assert!(bank.audit().await.is_empty());
    }

    #[tokio::test]
    async fn overdraw_races_settle_exactly_once() {
        // user 3 is the losing party of two concurrent settlements worth
        // 30 and 40 against a balance of 50: only one can go through.
        let bank = Arc::new(Bank::new(0));
        bank.open(3, 50).await;
        bank.open(1, 0).await;
        bank.open(2, 0).await;
        let a = {
            let bank = bank.clone();
            tokio::spawn(async move { bank.transfer(3, 1, 30).await })
        };
        let b = {
            let bank = bank.clone();
            tokio::spawn(async move { bank.transfer(3, 2, 40).await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a.is_ok() != b.is_ok());
        let deducted = if a.is_ok() { 30 } else { 40 };
        assert!(bank.balance(3).await == 50 - deducted);
        assert!(bank.audit().await.len() == 1);
    }

    #[tokio::test]
    async fn opposed_transfers_do_not_deadlock() {
        let bank = Arc::new(Bank::new(1_000));
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let fwd = bank.clone();
            tasks.push(tokio::spawn(async move { fwd.transfer(1, 2, 1).await }));
            let rev = bank.clone();
            tasks.push(tokio::spawn(async move { rev.transfer(2, 1, 1).await }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert!(bank.balance(1).await == 1_000);
        assert!(bank.balance(2).await == 1_000);
        assert!(bank.audit().await.len() == 100);
    }
}
