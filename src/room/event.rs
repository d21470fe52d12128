use crate::Coins;
use crate::UserId;
use crate::session::Face;
use crate::session::Fen;
use crate::session::Moves;
use crate::session::Reason;
use crate::session::Session;
use crate::session::Side;
use crate::session::Status;
use crate::session::Variant;
use serde::Serialize;

/// Outbound events fanned to a session's connections.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Snapshot of the session as stored. Sent to a joining connection
    /// and broadcast when activation changes everything at once.
    State {
        status: Status,
        stake: Coins,
        initiator: UserId,
        invitee: UserId,
        #[serde(skip_serializing_if = "Option::is_none")]
        choice: Option<Face>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fen: Option<Fen>,
        #[serde(skip_serializing_if = "Option::is_none")]
        moves: Option<Moves>,
        #[serde(skip_serializing_if = "Option::is_none")]
        white: Option<UserId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        black: Option<UserId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        white_time: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        black_time: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        your_side: Option<Side>,
    },
    Joined {
        user: UserId,
    },
    Move {
        #[serde(rename = "move")]
        uci: String,
        fen: Fen,
        by: UserId,
        white_time: u32,
        black_time: u32,
    },
    Result {
        winner: Option<UserId>,
        reason: Reason,
        stake: Coins,
        #[serde(skip_serializing_if = "Option::is_none")]
        flip: Option<Face>,
        #[serde(skip_serializing_if = "Option::is_none")]
        choice: Option<Face>,
    },
    Declined {
        user: UserId,
    },
    Error {
        message: String,
    },
}

impl Event {
    pub fn state(session: &Session, your_side: Option<Side>) -> Self {
        let (choice, fen, moves, white, black, white_time, black_time) = match session.variant() {
            Variant::Flip(flip) => (Some(flip.choice), None, None, None, None, None, None),
            Variant::Board(board) => (
                None,
                Some(board.fen.clone()),
                Some(board.moves.clone()),
                board.seats.map(|s| s.white),
                board.seats.map(|s| s.black),
                Some(board.clock.white),
                Some(board.clock.black),
            ),
        };
        Self::State {
            status: session.status(),
            stake: session.stake(),
            initiator: session.initiator(),
            invitee: session.invitee(),
            choice,
            fen,
            moves,
            white,
            black,
            white_time,
            black_time,
            your_side,
        }
    }

    /// The terminal broadcast for a resolved session.
    pub fn result(session: &Session) -> Self {
        let (winner, reason) = session
            .outcome()
            .map(|o| (o.winner, o.reason))
            .unwrap_or((None, Reason::Cancelled));
        let (flip, choice) = session
            .flip()
            .map(|f| (f.result, Some(f.choice)))
            .unwrap_or((None, None));
        Self::Result {
            winner,
            reason,
            stake: session.stake(),
            flip,
            choice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Draft;
    use crate::session::Pref;

    #[test]
    fn events_carry_their_type_tag() {
        let json = serde_json::to_value(Event::Joined { user: 3 }).unwrap();
        assert!(json["type"] == "joined");
        assert!(json["user"] == 3);
    }

    #[test]
    fn flip_state_skips_board_fields() {
        let session = Session::open(
            1,
            Draft::Flip {
                initiator: 1,
                invitee: 2,
                stake: 50,
                choice: Face::Heads,
            },
        );
        let json = serde_json::to_value(Event::state(&session, None)).unwrap();
        assert!(json["type"] == "state");
        assert!(json["status"] == "pending");
        assert!(json["choice"] == "heads");
        assert!(json.get("fen").is_none());
        assert!(json.get("your_side").is_none());
    }

    #[test]
    fn board_state_carries_position_and_clocks() {
        let session = Session::open(
            2,
            Draft::Board {
                initiator: 1,
                invitee: 2,
                stake: 25,
                pref: Pref::Random,
            },
        );
        let json = serde_json::to_value(Event::state(&session, Some(Side::White))).unwrap();
        assert!(json["white_time"] == 600);
        assert!(json["black_time"] == 600);
        assert!(json["your_side"] == "white");
        assert!(json.get("white").is_none());
    }
}
