use crate::session::Face;
use crate::session::Fen;
use crate::session::Reason;
use crate::session::Side;
use serde::Deserialize;

/// Inbound client actions over the per-session channel. Messages that do
/// not parse, including unknown action values, are dropped before they
/// reach the room.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Coin toss: the initiator re-commits their face while pending.
    Choose { face: Face },
    /// Coin toss: the invitee takes the bet. Resolves immediately.
    Accept,
    /// The invitee turns the challenge down.
    Decline,
    /// Board game: a move, with the position after it and the mover's
    /// report of both clocks.
    Move {
        #[serde(rename = "move")]
        uci: String,
        fen: Fen,
        #[serde(default)]
        white_time: Option<u32>,
        #[serde(default)]
        black_time: Option<u32>,
    },
    /// Board game: the sender concedes.
    Resign,
    /// Board game: a flag fell; the named side is out of time.
    ClockExpired { side: Side },
    /// Board game: the client's rules engine says the game ended.
    GameOver {
        reason: Reason,
        #[serde(default)]
        winner: Option<Side>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_actions() {
        let action: Action = serde_json::from_str(r#"{"action":"accept"}"#).unwrap();
        assert!(matches!(action, Action::Accept));
        let action: Action =
            serde_json::from_str(r#"{"action":"choose","face":"tails"}"#).unwrap();
        assert!(matches!(action, Action::Choose { face: Face::Tails }));
        let action: Action = serde_json::from_str(
            r#"{"action":"move","move":"e2e4","fen":"x b x","white_time":590}"#,
        )
        .unwrap();
        match action {
            Action::Move {
                uci,
                white_time,
                black_time,
                ..
            } => {
                assert!(uci == "e2e4");
                assert!(white_time == Some(590));
                assert!(black_time == None);
            }
            _ => panic!("expected a move"),
        }
    }

    #[test]
    fn unknown_actions_do_not_parse() {
        assert!(serde_json::from_str::<Action>(r#"{"action":"steal"}"#).is_err());
        assert!(serde_json::from_str::<Action>("not json").is_err());
    }
}
