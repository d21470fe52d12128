use super::Board;
use super::Face;
use super::Flip;
use super::Outcome;
use super::Pref;
use super::Status;
use super::Variant;
use crate::Coins;
use crate::SessionId;
use crate::UserId;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

/// What the external creation layer hands to the store: participants,
/// stake, and the variant-specific starting state.
#[derive(Clone, Copy, Debug)]
pub enum Draft {
    Flip {
        initiator: UserId,
        invitee: UserId,
        stake: Coins,
        choice: Face,
    },
    Board {
        initiator: UserId,
        invitee: UserId,
        stake: Coins,
        pref: Pref,
    },
}

/// One two-party staked game. The status field is the single
/// serialization point; all mutation goes through the owning Room.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Session {
    id: SessionId,
    initiator: UserId,
    invitee: UserId,
    stake: Coins,
    status: Status,
    #[serde(flatten)]
    variant: Variant,
    outcome: Option<Outcome>,
    created: DateTime<Utc>,
    started: Option<DateTime<Utc>>,
    ended: Option<DateTime<Utc>>,
}

impl Session {
    pub fn open(id: SessionId, draft: Draft) -> Self {
        let (initiator, invitee, stake, variant) = match draft {
            Draft::Flip {
                initiator,
                invitee,
                stake,
                choice,
            } => (
                initiator,
                invitee,
                stake,
                Variant::Flip(Flip {
                    choice,
                    result: None,
                }),
            ),
            Draft::Board {
                initiator,
                invitee,
                stake,
                pref,
            } => (initiator, invitee, stake, Variant::Board(Board::open(pref))),
        };
        Self {
            id,
            initiator,
            invitee,
            stake,
            status: Status::Pending,
            variant,
            outcome: None,
            created: Utc::now(),
            started: None,
            ended: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
    pub fn initiator(&self) -> UserId {
        self.initiator
    }
    pub fn invitee(&self) -> UserId {
        self.invitee
    }
    pub fn stake(&self) -> Coins {
        self.stake
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn variant(&self) -> &Variant {
        &self.variant
    }
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
    pub fn started(&self) -> Option<DateTime<Utc>> {
        self.started
    }
    pub fn ended(&self) -> Option<DateTime<Utc>> {
        self.ended
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        user == self.initiator || user == self.invitee
    }

    /// The other participant.
    pub fn opponent_of(&self, user: UserId) -> UserId {
        if user == self.initiator {
            self.invitee
        } else {
            self.initiator
        }
    }

    pub fn flip(&self) -> Option<&Flip> {
        match &self.variant {
            Variant::Flip(flip) => Some(flip),
            Variant::Board(_) => None,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        match &self.variant {
            Variant::Board(board) => Some(board),
            Variant::Flip(_) => None,
        }
    }
}

/// Mutators used only by the Store while it holds its write lock.
impl Session {
    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }
    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
    pub(crate) fn stamp_started(&mut self) {
        self.started = Some(Utc::now());
    }
    pub(crate) fn stamp_ended(&mut self) {
        self.ended = Some(Utc::now());
    }
    pub(crate) fn variant_mut(&mut self) -> &mut Variant {
        &mut self.variant
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} vs {} ({} coins) - {}",
            self.initiator, self.invitee, self.stake, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Fen;

    #[test]
    fn drafts_open_pending() {
        let flip = Session::open(
            1,
            Draft::Flip {
                initiator: 1,
                invitee: 2,
                stake: 50,
                choice: Face::Heads,
            },
        );
        assert!(flip.status() == Status::Pending);
        assert!(flip.outcome().is_none());
        assert!(flip.started().is_none());
        assert!(flip.flip().unwrap().result.is_none());

        let board = Session::open(
            2,
            Draft::Board {
                initiator: 1,
                invitee: 2,
                stake: 50,
                pref: Pref::Random,
            },
        );
        assert!(board.board().unwrap().fen == Fen::start());
        assert!(board.board().unwrap().seats.is_none());
        assert!(board.board().unwrap().clock.white == 600);
    }

    #[test]
    fn participants_only() {
        let session = Session::open(
            1,
            Draft::Flip {
                initiator: 4,
                invitee: 5,
                stake: 10,
                choice: Face::Tails,
            },
        );
        assert!(session.is_participant(4));
        assert!(session.is_participant(5));
        assert!(!session.is_participant(6));
        assert!(session.opponent_of(4) == 5);
        assert!(session.opponent_of(5) == 4);
    }
}
