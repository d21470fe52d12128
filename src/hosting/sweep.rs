use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodic expiry of stale pending challenges. An external caller of
/// the store's compare-and-set update; it never goes through a room and
/// never touches an active game.
pub struct Sweep;

impl Sweep {
    pub fn spawn(
        store: Arc<Store>,
        every: std::time::Duration,
        max_age: chrono::Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let expired = store.expire_pending(Utc::now() - max_age).await;
                if expired > 0 {
                    log::info!("expired {} stale challenges", expired);
                }
            }
        })
    }
}
