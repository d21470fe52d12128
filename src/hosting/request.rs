use crate::Coins;
use crate::UserId;
use crate::session::Face;
use crate::session::Pref;
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize)]
pub struct OpenFlip {
    pub initiator: UserId,
    pub invitee: UserId,
    pub stake: Coins,
    pub choice: Face,
}

#[derive(Serialize, Deserialize)]
pub struct OpenBoard {
    pub initiator: UserId,
    pub invitee: UserId,
    pub stake: Coins,
    pub pref: Pref,
}

/// Identity of the connecting participant, supplied by the fronting
/// guard. Authentication itself happens outside this service.
#[derive(Serialize, Deserialize)]
pub struct PlayQuery {
    pub user: UserId,
}
