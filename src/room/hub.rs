use super::Event;
use crate::ConnId;
use crate::SessionId;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

/// Fan-out of events to the live connections of each session. Delivery
/// is at most once per connection; ordering is whatever the owning Room
/// enqueues, since a Room processes its session's events serially.
#[derive(Default)]
pub struct Hub {
    groups: RwLock<HashMap<SessionId, HashMap<ConnId, UnboundedSender<String>>>>,
}

impl Hub {
    pub async fn join(&self, session: SessionId, conn: ConnId, tx: UnboundedSender<String>) {
        self.groups
            .write()
            .await
            .entry(session)
            .or_default()
            .insert(conn, tx);
    }

    /// Drops the connection from the group, and the group itself once
    /// empty. Returns the remaining occupancy.
    pub async fn leave(&self, session: SessionId, conn: ConnId) -> usize {
        let mut groups = self.groups.write().await;
        let remaining = match groups.get_mut(&session) {
            Some(group) => {
                group.remove(&conn);
                group.len()
            }
            None => 0,
        };
        if remaining == 0 {
            groups.remove(&session);
        }
        remaining
    }

    pub async fn occupancy(&self, session: SessionId) -> usize {
        self.groups
            .read()
            .await
            .get(&session)
            .map(|group| group.len())
            .unwrap_or(0)
    }

    /// Fans the event out to every member of the group. A member whose
    /// channel is gone is skipped; the bridge will report the disconnect.
    pub async fn publish(&self, session: SessionId, event: &Event) {
        let Some(json) = Self::encode(event) else {
            return;
        };
        if let Some(group) = self.groups.read().await.get(&session) {
            group
                .iter()
                .filter_map(|(conn, tx)| tx.send(json.clone()).err().map(|_| conn))
                .for_each(|conn| log::warn!("failed publish to conn {} in {}", conn, session));
        }
    }

    /// Delivers an event to a single member of the group.
    pub async fn unicast(&self, session: SessionId, conn: ConnId, event: &Event) {
        let Some(json) = Self::encode(event) else {
            return;
        };
        if let Some(tx) = self
            .groups
            .read()
            .await
            .get(&session)
            .and_then(|group| group.get(&conn))
        {
            tx.send(json)
                .inspect_err(|_| log::warn!("failed unicast to conn {} in {}", conn, session))
                .ok();
        }
    }

    fn encode(event: &Event) -> Option<String> {
        serde_json::to_string(event)
            .inspect_err(|e| log::error!("failed to encode event: {}", e))
            .ok()
    }
}
