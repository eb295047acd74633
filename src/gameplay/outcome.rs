use serde::Deserialize;
use serde::Serialize;

/// Cross-game terminal reading: either the session is still live, or one
/// seat won, or it ended level. Timeouts and resignations are decided by
/// the session layer and the remote record, not by the rule engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Winner(usize),
    Draw,
}

impl Outcome {
    pub fn terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in progress"),
            Self::Winner(seat) => write!(f, "seat {} wins", seat),
            Self::Draw => write!(f, "draw"),
        }
    }
}
