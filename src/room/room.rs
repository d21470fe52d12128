use super::Action;
use super::Command;
use super::Event;
use super::Hub;
use super::Toss;
use crate::ConnId;
use crate::SessionId;
use crate::UserId;
use crate::ledger::Ledger;
use crate::ledger::TransferError;
use crate::notify::Kind;
use crate::notify::Notifier;
use crate::session::*;
use crate::store::Store;
use crate::store::StoreError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Coordinator for one live session. Owns the session's command channel
/// and processes it serially, which is what makes duplicate terminal
/// actions settle exactly once: the losing race finds the status already
/// moved and drops out at the store's compare-and-set.
///
/// Invalid or out-of-state actions are dropped silently; a client retry
/// is harmless.
pub struct Room {
    id: SessionId,
    store: Arc<Store>,
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    hub: Arc<Hub>,
    toss: Arc<dyn Toss>,
    present: HashMap<ConnId, UserId>,
    commands: UnboundedReceiver<Command>,
}

impl Room {
    /// Spawns the room task and returns its command channel.
    pub fn spawn(
        id: SessionId,
        store: Arc<Store>,
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        hub: Arc<Hub>,
        toss: Arc<dyn Toss>,
    ) -> UnboundedSender<Command> {
        let (tx, rx) = unbounded_channel();
        let room = Self {
            id,
            store,
            ledger,
            notifier,
            hub,
            toss,
            present: HashMap::new(),
            commands: rx,
        };
        tokio::spawn(room.run());
        tx
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Admit { user, conn, tx } => self.admit(user, conn, tx).await,
                Command::Act { user, action } => self.act(user, action).await,
                Command::Leave { user, conn } => self.leave(user, conn).await,
            }
        }
        log::info!("room {} retired", self.id);
    }
}

impl Room {
    /// Registers the connection with the hub group, activates a board
    /// game once both participants are here, and hands the joiner the
    /// current state. Terminal sessions stay viewable.
    async fn admit(&mut self, user: UserId, conn: ConnId, tx: UnboundedSender<String>) {
        self.hub.join(self.id, conn, tx).await;
        self.present.insert(conn, user);
        let Some(mut session) = self.store.get(self.id).await else {
            log::warn!("room {} admitted conn {} but session is gone", self.id, conn);
            return;
        };
        log::info!("conn {} (user {}) joined session {}", conn, user, self.id);
        if session.board().is_some()
            && session.status() == Status::Pending
            && self.both_present(&session)
        {
            if let Some(active) = self.activate(&session).await {
                session = active;
            }
        }
        let side = session
            .board()
            .and_then(|board| board.seats)
            .and_then(|seats| seats.side_of(user));
        self.hub
            .unicast(self.id, conn, &Event::state(&session, side))
            .await;
        self.hub.publish(self.id, &Event::Joined { user }).await;
    }

    async fn leave(&mut self, user: UserId, conn: ConnId) {
        self.present.remove(&conn);
        self.hub.leave(self.id, conn).await;
        log::info!("conn {} (user {}) left session {}", conn, user, self.id);
    }

    fn both_present(&self, session: &Session) -> bool {
        let joined = self.present.values().collect::<std::collections::HashSet<_>>();
        joined.contains(&session.initiator()) && joined.contains(&session.invitee())
    }

    /// Seats both sides and starts the clock. The random assignment is
    /// drawn once and stored; a rerun finds the session already active
    /// and backs off at the compare-and-set.
    async fn activate(&self, session: &Session) -> Option<Session> {
        let board = session.board()?;
        let (white, black) = match board.pref {
            Pref::White => (session.initiator(), session.invitee()),
            Pref::Black => (session.invitee(), session.initiator()),
            Pref::Random => match self.toss.toss() {
                Face::Heads => (session.initiator(), session.invitee()),
                Face::Tails => (session.invitee(), session.initiator()),
            },
        };
        match self.store.activate(self.id, Seats { white, black }).await {
            Ok(active) => {
                log::info!(
                    "session {} activated: white={} black={}",
                    self.id,
                    white,
                    black
                );
                self.hub.publish(self.id, &Event::state(&active, None)).await;
                Some(active)
            }
            Err(StoreError::Conflict { .. }) => None,
            Err(e) => {
                log::warn!("session {} failed to activate: {}", self.id, e);
                None
            }
        }
    }
}

impl Room {
    async fn act(&mut self, user: UserId, action: Action) {
        let Some(session) = self.store.get(self.id).await else {
            return;
        };
        if !session.is_participant(user) {
            return;
        }
        match action {
            Action::Choose { face } => self.choose(&session, user, face).await,
            Action::Accept => self.accept(&session, user).await,
            Action::Decline => self.decline(&session, user).await,
            Action::Move {
                uci,
                fen,
                white_time,
                black_time,
            } => {
                self.relay(&session, user, uci, fen, white_time, black_time)
                    .await
            }
            Action::Resign => self.resign(&session, user).await,
            Action::ClockExpired { side } => self.flag(&session, side).await,
            Action::GameOver { reason, winner } => self.claim(&session, reason, winner).await,
        }
    }

    /// Coin toss: the initiator re-commits their face while the bet is
    /// still on the table. Not echoed to the group.
    async fn choose(&self, session: &Session, user: UserId, face: Face) {
        if session.flip().is_none()
            || session.status() != Status::Pending
            || user != session.initiator()
        {
            return;
        }
        self.store.choose(self.id, face).await.ok();
    }

    /// Coin toss: the invitee takes the bet and the toss resolves on the
    /// spot. The initiator wins iff the draw matches their committed face.
    async fn accept(&self, session: &Session, user: UserId) {
        let Some(flip) = session.flip() else {
            return;
        };
        if session.status() != Status::Pending || user != session.invitee() {
            return;
        }
        let face = self.toss.toss();
        let winner = if face == flip.choice {
            session.initiator()
        } else {
            session.invitee()
        };
        self.resolve(Status::Pending, Some(winner), Reason::Flip, Some(face))
            .await;
    }

    async fn decline(&self, session: &Session, user: UserId) {
        if session.status() != Status::Pending || user != session.invitee() {
            return;
        }
        match self.store.decline(self.id).await {
            Ok(declined) => {
                log::info!("session {} declined by {}", self.id, user);
                debug_assert!(declined.status().is_terminal());
                self.hub.publish(self.id, &Event::Declined { user }).await;
            }
            Err(_) => {}
        }
    }

    /// Persists and relays a move. The turn is derived from the stored
    /// position, never from the asserted identity: a move from the side
    /// not on the clock is dropped without a trace.
    async fn relay(
        &self,
        session: &Session,
        user: UserId,
        uci: String,
        fen: Fen,
        white_time: Option<u32>,
        black_time: Option<u32>,
    ) {
        let Some(board) = session.board() else {
            return;
        };
        if session.status() != Status::Active {
            return;
        }
        let Some(seats) = board.seats else {
            return;
        };
        let Some(side) = seats.side_of(user) else {
            return;
        };
        let uci = uci.trim().to_string();
        if uci.is_empty() || fen.is_empty() {
            return;
        }
        if board.fen.to_move() != side {
            return;
        }
        if let Ok(saved) = self
            .store
            .append_move(self.id, &uci, fen, white_time, black_time)
            .await
        {
            if let Some(board) = saved.board() {
                self.hub
                    .publish(
                        self.id,
                        &Event::Move {
                            uci,
                            fen: board.fen.clone(),
                            by: user,
                            white_time: board.clock.white,
                            black_time: board.clock.black,
                        },
                    )
                    .await;
            }
        }
    }

    async fn resign(&self, session: &Session, user: UserId) {
        let Some(board) = session.board() else {
            return;
        };
        if session.status() != Status::Active {
            return;
        }
        let Some(seats) = board.seats else {
            return;
        };
        let Some(side) = seats.side_of(user) else {
            return;
        };
        let winner = seats.user_of(side.other());
        self.resolve(Status::Active, Some(winner), Reason::Resignation, None)
            .await;
    }

    /// A reported flag fall: the named side is out of time and the other
    /// side takes the stake.
    async fn flag(&self, session: &Session, side: Side) {
        let Some(board) = session.board() else {
            return;
        };
        if session.status() != Status::Active {
            return;
        }
        let Some(seats) = board.seats else {
            return;
        };
        let winner = seats.user_of(side.other());
        self.resolve(Status::Active, Some(winner), Reason::Timeout, None)
            .await;
    }

    /// A client-reported game end. Chess legality is the client's rules
    /// engine's problem; the claimed winner is accepted by seat color,
    /// which pins it to one of the two known assignments.
    async fn claim(&self, session: &Session, reason: Reason, winner: Option<Side>) {
        let Some(board) = session.board() else {
            return;
        };
        if session.status() != Status::Active {
            return;
        }
        let Some(seats) = board.seats else {
            return;
        };
        match reason {
            Reason::Stalemate | Reason::Draw => {
                self.resolve(Status::Active, None, reason, None).await;
            }
            Reason::Checkmate => {
                let Some(side) = winner else {
                    return;
                };
                self.resolve(
                    Status::Active,
                    Some(seats.user_of(side)),
                    Reason::Checkmate,
                    None,
                )
                .await;
            }
            _ => {}
        }
    }
}

impl Room {
    /// The terminal sequence. First the status, winner, and reason land
    /// in one store write conditioned on the expected status; a losing
    /// race ends here as a no-op. Then the stake moves through the
    /// ledger; if that fails the session rolls forward to cancelled and
    /// the group hears an error instead of a result. Draws skip the
    /// ledger entirely.
    async fn resolve(
        &self,
        expect: Status,
        winner: Option<UserId>,
        reason: Reason,
        face: Option<Face>,
    ) {
        let outcome = Outcome::from((winner, reason));
        let completed = match self.store.complete(self.id, expect, outcome, face).await {
            Ok(session) => session,
            Err(StoreError::Conflict { .. }) => return,
            Err(e) => {
                log::warn!("session {} failed to complete: {}", self.id, e);
                return;
            }
        };
        let Some(winner) = winner else {
            log::info!("session {} drawn: {}", self.id, reason);
            self.hub.publish(self.id, &Event::result(&completed)).await;
            return;
        };
        let loser = completed.opponent_of(winner);
        match self
            .ledger
            .transfer(loser, winner, completed.stake())
            .await
        {
            Ok(_) => {
                log::info!(
                    "session {} resolved: winner={} loser={} stake={} reason={}",
                    self.id,
                    winner,
                    loser,
                    completed.stake(),
                    reason
                );
                self.congratulate(&completed, winner, loser).await;
                self.hub.publish(self.id, &Event::result(&completed)).await;
            }
            Err(e) => {
                log::warn!("session {} cancelled, settlement failed: {}", self.id, e);
                self.store
                    .cancel(self.id, Status::Completed)
                    .await
                    .inspect_err(|e| {
                        log::error!("session {} failed to compensate: {}", self.id, e)
                    })
                    .ok();
                let message = match e {
                    TransferError::InsufficientFunds { .. } => {
                        "Game cancelled: a player no longer has sufficient balance."
                    }
                    TransferError::Rejected(_) => {
                        "An unexpected error occurred. The game has been cancelled."
                    }
                };
                self.hub
                    .publish(
                        self.id,
                        &Event::Error {
                            message: message.to_string(),
                        },
                    )
                    .await;
            }
        }
    }

    /// Both parties hear how it went. Best effort, after the stake has
    /// already moved.
    async fn congratulate(&self, session: &Session, winner: UserId, loser: UserId) {
        let stake = session.stake();
        let (won, lost, link) = match session.variant() {
            Variant::Flip(flip) => {
                let face = flip.result.map(|f| f.to_string()).unwrap_or_default();
                (
                    format!("You won {} coins. The coin landed on {}.", stake, face),
                    format!("You lost {} coins. The coin landed on {}.", stake, face),
                    "/flips/",
                )
            }
            Variant::Board(_) => {
                let reason = session
                    .outcome()
                    .map(|o| o.reason.to_string())
                    .unwrap_or_default();
                (
                    format!("You won {} coins by {}.", stake, reason),
                    format!("You lost {} coins by {}.", stake, reason),
                    "/boards/",
                )
            }
        };
        self.notifier
            .notify(winner, Kind::GameResult, "You won!", &won, link)
            .await;
        self.notifier
            .notify(loser, Kind::GameResult, "You lost", &lost, link)
            .await;
    }
}
