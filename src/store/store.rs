use super::StoreError;
use crate::SessionId;
use crate::UserId;
use crate::session::*;
use chrono::DateTime;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;

/// Source of truth for Session entities. Status transitions are
/// compare-and-set on the expected current status, so concurrent terminal
/// actions racing for the same session lose cleanly instead of writing
/// twice. Terminal sessions are retained as history, never deleted.
pub struct Store {
    sessions: RwLock<HashMap<SessionId, Session>>,
    count: AtomicU64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            count: AtomicU64::new(1),
        }
    }
}

impl Store {
    pub async fn create(&self, draft: Draft) -> Session {
        let id = self.count.fetch_add(1, Ordering::Relaxed);
        let session = Session::open(id, draft);
        self.sessions.write().await.insert(id, session.clone());
        log::info!("created session {}", session);
        session
    }

    pub async fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Sessions involving a user in a given status, newest first.
    pub async fn involving(&self, user: UserId, status: Status) -> Vec<Session> {
        let mut found = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_participant(user) && s.status() == status)
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by_key(|s| std::cmp::Reverse(s.created()));
        found
    }

    /// Whether an undecided challenge already exists from this initiator
    /// to this invitee.
    pub async fn duplicate_pending(&self, initiator: UserId, invitee: UserId) -> bool {
        self.sessions
            .read()
            .await
            .values()
            .any(|s| {
                s.status() == Status::Pending
                    && s.initiator() == initiator
                    && s.invitee() == invitee
            })
    }

    /// Re-commits the initiator's face while the toss is still pending.
    pub async fn choose(&self, id: SessionId, face: Face) -> Result<Session, StoreError> {
        self.transition(id, Status::Pending, Status::Pending, |session| {
            if let Variant::Flip(flip) = session.variant_mut() {
                flip.choice = face;
            }
        })
        .await
    }

    /// Seats both sides and starts the game. At most once per session.
    pub async fn activate(&self, id: SessionId, seats: Seats) -> Result<Session, StoreError> {
        self.transition(id, Status::Pending, Status::Active, |session| {
            if let Variant::Board(board) = session.variant_mut() {
                board.seats = Some(seats);
            }
            session.stamp_started();
        })
        .await
    }

    /// Appends a move and updates position and clocks. Read-modify-write
    /// under the store's write lock: concurrent saves append, never
    /// overwrite each other's moves.
    pub async fn append_move(
        &self,
        id: SessionId,
        uci: &str,
        fen: Fen,
        white_time: Option<u32>,
        black_time: Option<u32>,
    ) -> Result<Session, StoreError> {
        self.transition(id, Status::Active, Status::Active, |session| {
            if let Variant::Board(board) = session.variant_mut() {
                board.moves.push(uci);
                board.fen = fen;
                if let Some(secs) = white_time {
                    board.clock.white = secs;
                }
                if let Some(secs) = black_time {
                    board.clock.black = secs;
                }
            }
        })
        .await
    }

    /// The terminal write of a resolved game: status, winner, and reason
    /// land in one store write, so a completed session is never observable
    /// without its outcome.
    pub async fn complete(
        &self,
        id: SessionId,
        expect: Status,
        outcome: Outcome,
        face: Option<Face>,
    ) -> Result<Session, StoreError> {
        self.transition(id, expect, Status::Completed, |session| {
            session.set_outcome(outcome);
            if let (Variant::Flip(flip), Some(face)) = (session.variant_mut(), face) {
                flip.result = Some(face);
            }
            session.stamp_ended();
        })
        .await
    }

    /// Compensating transition for a settlement that could not go through.
    pub async fn cancel(&self, id: SessionId, expect: Status) -> Result<Session, StoreError> {
        self.transition(id, expect, Status::Cancelled, |session| {
            session.set_outcome(Outcome::from((None, Reason::Cancelled)));
            session.stamp_ended();
        })
        .await
    }

    /// Invitee turns the challenge down. Coin tosses record a decline;
    /// board games fold straight to cancelled. No coins move either way.
    pub async fn decline(&self, id: SessionId) -> Result<Session, StoreError> {
        let target = match self.get(id).await {
            Some(session) => match session.variant() {
                Variant::Flip(_) => Status::Declined,
                Variant::Board(_) => Status::Cancelled,
            },
            None => return Err(StoreError::Missing(id)),
        };
        self.transition(id, Status::Pending, target, |session| {
            session.stamp_ended();
        })
        .await
    }

    /// External sweep: stale pending sessions expire. Never touches an
    /// active game. Returns how many were expired.
    pub async fn expire_pending(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut expired = 0;
        for session in sessions.values_mut() {
            if session.status() == Status::Pending && session.created() < cutoff {
                session.set_status(Status::Expired);
                session.stamp_ended();
                expired += 1;
            }
        }
        expired
    }

    /// The compare-and-set primitive every transition goes through. The
    /// status check, the status write, and the payload mutation happen
    /// under one write lock acquisition.
    async fn transition(
        &self,
        id: SessionId,
        expect: Status,
        next: Status,
        apply: impl FnOnce(&mut Session),
    ) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(StoreError::Missing(id))?;
        if session.status() != expect {
            return Err(StoreError::Conflict {
                id,
                expected: expect,
                found: session.status(),
            });
        }
        session.set_status(next);
        apply(session);
        Ok(session.clone())
    }
}
