use serde::Deserialize;
use serde::Serialize;

/// Which rule engine a session runs.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Chess,
    Holdem,
    Blackjack,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Chess => write!(f, "chess"),
            Self::Holdem => write!(f, "holdem"),
            Self::Blackjack => write!(f, "blackjack"),
        }
    }
}

/// Who sits across the table.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// a robot opponent decided locally, stats reported at the end
    Bot,
    /// a remote peer joined through a lobby
    Peer,
    /// both seats driven from this machine
    Local,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Bot => write!(f, "bot"),
            Self::Peer => write!(f, "peer"),
            Self::Local => write!(f, "local"),
        }
    }
}
