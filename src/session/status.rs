use serde::Deserialize;
use serde::Serialize;

/// Session lifecycle states. Pending is initial; a session that reaches
/// any terminal state never transitions again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Active,
    Completed,
    Declined,
    Cancelled,
    Expired,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Declined | Self::Cancelled | Self::Expired
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Declined => write!(f, "declined"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Active.is_terminal());
        assert!(Status::Completed.is_terminal());
        assert!(Status::Declined.is_terminal());
        assert!(Status::Cancelled.is_terminal());
        assert!(Status::Expired.is_terminal());
    }
}
