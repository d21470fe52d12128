use super::Clock;
use super::Face;
use super::Fen;
use super::Moves;
use super::Pref;
use super::Side;
use crate::UserId;
use serde::Serialize;

/// Game-specific payload. Both variants share the surrounding Session
/// shape; only the in-game state differs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Variant {
    Flip(Flip),
    Board(Board),
}

/// Coin-toss payload: the initiator's committed face, and the face the
/// draw resolved to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Flip {
    pub choice: Face,
    pub result: Option<Face>,
}

/// Board-game payload: position, move log, clocks, and the seat
/// assignment resolved on activation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Board {
    pub fen: Fen,
    pub moves: Moves,
    pub clock: Clock,
    pub pref: Pref,
    pub seats: Option<Seats>,
}

impl Board {
    pub fn open(pref: Pref) -> Self {
        Self {
            fen: Fen::start(),
            moves: Moves::default(),
            clock: Clock::default(),
            pref,
            seats: None,
        }
    }
}

/// Which user holds which color. Assigned exactly once, never re-rolled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Seats {
    pub white: UserId,
    pub black: UserId,
}

impl Seats {
    pub fn side_of(&self, user: UserId) -> Option<Side> {
        if self.white == user {
            Some(Side::White)
        } else if self.black == user {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn user_of(&self, side: Side) -> UserId {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_map_both_ways() {
        let seats = Seats { white: 7, black: 9 };
        assert!(seats.side_of(7) == Some(Side::White));
        assert!(seats.side_of(9) == Some(Side::Black));
        assert!(seats.side_of(8) == None);
        assert!(seats.user_of(Side::White) == 7);
        assert!(seats.user_of(Side::Black) == 9);
    }
}
