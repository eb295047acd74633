use serde::Deserialize;
use serde::Serialize;

/// Betting streets in dealing order. Strictly forward; no backward transition.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Stage {
    pub const fn next(&self) -> Self {
        match self {
            Self::PreFlop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River => Self::Showdown,
            Self::Showdown => panic!("terminal"),
        }
    }
    /// community cards revealed on entering this street
    pub const fn reveals(&self) -> usize {
        match self {
            Self::PreFlop => 0,
            Self::Flop => 3,
            Self::Turn => 1,
            Self::River => 1,
            Self::Showdown => 0,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PreFlop => write!(f, "preflop"),
            Self::Flop => write!(f, "flop"),
            Self::Turn => write!(f, "turn"),
            Self::River => write!(f, "river"),
            Self::Showdown => write!(f, "showdown"),
        }
    }
}
