use crate::Coins;
use crate::ConnId;
use crate::SessionId;
use crate::UserId;
use crate::ledger::Ledger;
use crate::notify::Kind;
use crate::notify::Notifier;
use crate::room::Action;
use crate::room::Command;
use crate::room::Hub;
use crate::room::Room;
use crate::room::Toss;
use crate::session::Draft;
use crate::session::Face;
use crate::session::Pref;
use crate::session::Session;
use crate::store::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Why the creation API turned a challenge down.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("stake must be positive")]
    ZeroStake,
    #[error("maximum stake is {0} coins")]
    StakeTooHigh(Coins),
    #[error("you cannot challenge yourself")]
    SelfChallenge,
    #[error("user {0} does not have enough coins")]
    ShortOnCoins(UserId),
    #[error("a pending challenge already exists with user {0}")]
    Duplicate(UserId),
}

struct Slot {
    tx: UnboundedSender<Command>,
    members: usize,
}

/// Manages live rooms and their lifecycles: one Room task per session
/// with at least one connection, spawned on first attach and released
/// when the last connection detaches. Also hosts the challenge-creation
/// API in front of the store.
pub struct Arena {
    store: Arc<Store>,
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    hub: Arc<Hub>,
    toss: Arc<dyn Toss>,
    rooms: RwLock<HashMap<SessionId, Slot>>,
    conns: AtomicU64,
    max_stake: Coins,
}

impl Arena {
    pub fn new(
        store: Arc<Store>,
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        hub: Arc<Hub>,
        toss: Arc<dyn Toss>,
        max_stake: Coins,
    ) -> Self {
        Self {
            store,
            ledger,
            notifier,
            hub,
            toss,
            rooms: RwLock::new(HashMap::new()),
            conns: AtomicU64::new(1),
            max_stake,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

/// Challenge creation, the external CRUD layer in front of the core.
/// The balance checks here are a courtesy pre-check; the binding check
/// happens inside the ledger at settlement time.
impl Arena {
    pub async fn open_flip(
        &self,
        initiator: UserId,
        invitee: UserId,
        stake: Coins,
        choice: Face,
    ) -> Result<Session, Refusal> {
        self.vet(initiator, invitee, stake).await?;
        let session = self
            .store
            .create(Draft::Flip {
                initiator,
                invitee,
                stake,
                choice,
            })
            .await;
        self.invite(invitee, initiator, stake, "coin flip", session.id())
            .await;
        Ok(session)
    }

    pub async fn open_board(
        &self,
        initiator: UserId,
        invitee: UserId,
        stake: Coins,
        pref: Pref,
    ) -> Result<Session, Refusal> {
        self.vet(initiator, invitee, stake).await?;
        let session = self
            .store
            .create(Draft::Board {
                initiator,
                invitee,
                stake,
                pref,
            })
            .await;
        self.invite(invitee, initiator, stake, "chess game", session.id())
            .await;
        Ok(session)
    }

    async fn vet(&self, initiator: UserId, invitee: UserId, stake: Coins) -> Result<(), Refusal> {
        if stake == 0 {
            return Err(Refusal::ZeroStake);
        }
        if stake > self.max_stake {
            return Err(Refusal::StakeTooHigh(self.max_stake));
        }
        if initiator == invitee {
            return Err(Refusal::SelfChallenge);
        }
        if self.ledger.balance(initiator).await < stake {
            return Err(Refusal::ShortOnCoins(initiator));
        }
        if self.ledger.balance(invitee).await < stake {
            return Err(Refusal::ShortOnCoins(invitee));
        }
        if self.store.duplicate_pending(initiator, invitee).await {
            return Err(Refusal::Duplicate(invitee));
        }
        Ok(())
    }

    async fn invite(
        &self,
        invitee: UserId,
        initiator: UserId,
        stake: Coins,
        game: &str,
        id: SessionId,
    ) {
        let message = format!(
            "User {} challenged you to a {} for {} coins!",
            initiator, game, stake
        );
        let link = format!("/play/{}/", id);
        self.notifier
            .notify(invitee, Kind::GameInvite, "Game Challenge!", &message, &link)
            .await;
    }
}

/// Connection plumbing.
impl Arena {
    /// Vets the user against the session's participants, finds or spawns
    /// the owning room, and admits the connection. Returns the connection
    /// id, the room's command channel, and the connection's event feed.
    pub async fn attach(
        &self,
        id: SessionId,
        user: UserId,
    ) -> anyhow::Result<(ConnId, UnboundedSender<Command>, UnboundedReceiver<String>)> {
        let session = self
            .store
            .get(id)
            .await
            .ok_or_else(|| anyhow::anyhow!("session {} not found", id))?;
        if !session.is_participant(user) {
            anyhow::bail!("user {} is not part of session {}", user, id);
        }
        let conn = self.conns.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded_channel();
        let mut rooms = self.rooms.write().await;
        let slot = rooms.entry(id).or_insert_with(|| Slot {
            tx: self.spawn(id),
            members: 0,
        });
        if slot.tx.is_closed() {
            slot.tx = self.spawn(id);
        }
        slot.members += 1;
        slot.tx
            .send(Command::Admit { user, conn, tx })
            .map_err(|_| anyhow::anyhow!("room {} is gone", id))?;
        Ok((conn, slot.tx.clone(), rx))
    }

    /// Reports the disconnect to the room and releases the room once its
    /// last connection is gone. The durable session record stays behind.
    pub async fn detach(&self, id: SessionId, user: UserId, conn: ConnId) {
        let mut rooms = self.rooms.write().await;
        if let Some(slot) = rooms.get_mut(&id) {
            slot.tx.send(Command::Leave { user, conn }).ok();
            slot.members = slot.members.saturating_sub(1);
            if slot.members == 0 {
                rooms.remove(&id);
                log::info!("room {} released", id);
            }
        }
    }

    /// Spawns the WebSocket bridge between a client connection and the
    /// owning room's channels.
    pub async fn bridge(
        arena: Arc<Self>,
        id: SessionId,
        user: UserId,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        use futures::StreamExt;
        let (conn, room, mut events) = arena
            .attach(id, user)
            .await
            .inspect(|_| log::info!("user {} connected to session {}", user, id))?;
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    event = events.recv() => match event {
                        Some(json) => if session.text(json).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => {
                            // silently drop anything that does not parse
                            if let Ok(action) = serde_json::from_str::<Action>(&text) {
                                if room.send(Command::Act { user, action }).is_err() {
                                    break 'sesh;
                                }
                            }
                        }
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            arena.detach(id, user, conn).await;
        });
        Ok(())
    }

    fn spawn(&self, id: SessionId) -> UnboundedSender<Command> {
        Room::spawn(
            id,
            self.store.clone(),
            self.ledger.clone(),
            self.notifier.clone(),
            self.hub.clone(),
            self.toss.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Bank;
    use crate::notify::Inbox;
    use crate::room::Fixed;

    async fn arena(opening: Coins) -> Arena {
        Arena::new(
            Arc::new(Store::default()),
            Arc::new(Bank::new(opening)),
            Arc::new(Inbox::default()),
            Arc::new(Hub::default()),
            Arc::new(Fixed(Face::Heads)),
            10_000,
        )
    }

    #[tokio::test]
    async fn creation_is_vetted() {
        let arena = arena(100).await;
        let refused = |result: Result<Session, Refusal>| result.unwrap_err();
        assert!(refused(arena.open_flip(1, 2, 0, Face::Heads).await) == Refusal::ZeroStake);
        assert!(
            refused(arena.open_flip(1, 2, 20_000, Face::Heads).await)
                == Refusal::StakeTooHigh(10_000)
        );
        assert!(refused(arena.open_flip(1, 1, 50, Face::Heads).await) == Refusal::SelfChallenge);
        assert!(
            refused(arena.open_flip(1, 2, 500, Face::Heads).await) == Refusal::ShortOnCoins(1)
        );
        assert!(arena.open_flip(1, 2, 50, Face::Heads).await.is_ok());
        assert!(refused(arena.open_flip(1, 2, 50, Face::Heads).await) == Refusal::Duplicate(2));
    }

    #[tokio::test]
    async fn invitation_follows_creation() {
        let arena = arena(100).await;
        let inbox = Arc::new(Inbox::default());
        let arena = Arena::new(
            arena.store.clone(),
            arena.ledger.clone(),
            inbox.clone(),
            arena.hub.clone(),
            arena.toss.clone(),
            10_000,
        );
        arena.open_board(1, 2, 50, Pref::Random).await.unwrap();
        assert!(inbox.unread(2).await == 1);
        assert!(inbox.unread(1).await == 0);
    }

    #[tokio::test]
    async fn attach_refuses_strangers_and_ghosts() {
        let arena = arena(100).await;
        assert!(arena.attach(99, 1).await.is_err());
        let session = arena.open_flip(1, 2, 50, Face::Heads).await.unwrap();
        assert!(arena.attach(session.id(), 3).await.is_err());
        assert!(arena.attach(session.id(), 1).await.is_ok());
    }

    #[tokio::test]
    async fn rooms_are_released_with_their_last_connection() {
        let arena = arena(100).await;
        let session = arena.open_flip(1, 2, 50, Face::Heads).await.unwrap();
        let (conn1, _, _rx1) = arena.attach(session.id(), 1).await.unwrap();
        let (conn2, _, _rx2) = arena.attach(session.id(), 2).await.unwrap();
        assert!(arena.rooms.read().await.len() == 1);
        arena.detach(session.id(), 1, conn1).await;
        assert!(arena.rooms.read().await.len() == 1);
        arena.detach(session.id(), 2, conn2).await;
        assert!(arena.rooms.read().await.is_empty());
        // the durable record survives the room
        assert!(arena.store.get(session.id()).await.is_some());
    }
}
