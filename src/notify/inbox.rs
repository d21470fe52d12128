use super::Kind;
use super::Notifier;
use crate::UserId;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A delivered message.
#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub kind: Kind,
    pub title: String,
    pub message: String,
    pub link: String,
    pub read: bool,
    pub at: DateTime<Utc>,
}

/// In-process notifier: per-user ordered message lists, newest last.
#[derive(Default)]
pub struct Inbox {
    messages: RwLock<HashMap<UserId, Vec<Message>>>,
}

impl Inbox {
    pub async fn messages(&self, user: UserId) -> Vec<Message> {
        self.messages
            .read()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn unread(&self, user: UserId) -> usize {
        self.messages
            .read()
            .await
            .get(&user)
            .map(|inbox| inbox.iter().filter(|m| !m.read).count())
            .unwrap_or(0)
    }

    pub async fn mark_read(&self, user: UserId) {
        if let Some(inbox) = self.messages.write().await.get_mut(&user) {
            for message in inbox.iter_mut() {
                message.read = true;
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for Inbox {
    async fn notify(&self, user: UserId, kind: Kind, title: &str, message: &str, link: &str) {
        self.messages
            .write()
            .await
            .entry(user)
            .or_default()
            .push(Message {
                kind,
                title: title.to_string(),
                message: message.to_string(),
                link: link.to_string(),
                read: false,
                at: Utc::now(),
            });
    }
}
