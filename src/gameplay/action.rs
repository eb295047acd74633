#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Chess(crate::chess::Move),
    Holdem(crate::holdem::Action),
    Blackjack(crate::blackjack::Action),
}

impl Action {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Chess(_) => Kind::Chess,
            Self::Holdem(_) => Kind::Holdem,
            Self::Blackjack(_) => Kind::Blackjack,
        }
    }

    /// parse the lowercase wire form for one game kind; this is the exact
    /// format the oracle must echo for a suggestion to be accepted
    pub fn parse(kind: Kind, s: &str) -> anyhow::Result<Self> {
        match kind {
            Kind::Chess => Ok(Self::Chess(crate::chess::Move::try_from(s)?)),
            Kind::Holdem => Ok(Self::Holdem(crate::holdem::Action::try_from(s)?)),
            Kind::Blackjack => Ok(Self::Blackjack(crate::blackjack::Action::try_from(s)?)),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Action::Chess(m) => write!(f, "{}", m),
            Action::Holdem(a) => write!(f, "{}", a),
            Action::Blackjack(a) => write!(f, "{}", a),
        }
    }
}

/// One entry of a session's append-only action log: the action and the
/// seat that took it. The sequence index is the entry's offset in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub seat: usize,
    pub action: Action,
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{} {}", self.seat, self.action)
    }
}

use super::kind::Kind;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
