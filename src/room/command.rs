use super::Action;
use crate::ConnId;
use crate::UserId;
use tokio::sync::mpsc::UnboundedSender;

/// Everything a Room can be asked to do, delivered over its single
/// command channel and processed serially.
#[derive(Debug)]
pub enum Command {
    /// A vetted participant's connection arrives. The sender is the
    /// connection's outbound half, to be registered with the hub group.
    Admit {
        user: UserId,
        conn: ConnId,
        tx: UnboundedSender<String>,
    },
    /// A client action, already parsed off the wire.
    Act { user: UserId, action: Action },
    /// The connection went away. Does not cancel anything.
    Leave { user: UserId, conn: ConnId },
}
