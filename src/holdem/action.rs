#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    Shove,
}

/// str isomorphism, lowercase wire form: "fold", "check", "call",
/// "raise 40", "all-in". This is also the exact format the oracle must
/// echo back for a suggestion to be accepted.
impl TryFrom<&str> for Action {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        match s {
            "fold" => Ok(Self::Fold),
            "check" => Ok(Self::Check),
            "call" => Ok(Self::Call),
            "all-in" => Ok(Self::Shove),
            _ => match s.strip_prefix("raise ") {
                Some(amount) => Ok(Self::Raise(amount.trim().parse::<Chips>()?)),
                None => Err(anyhow::anyhow!("invalid poker action: {}", s)),
            },
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Raise(amount) => write!(f, "raise {}", amount),
            Action::Shove => write!(f, "all-in"),
        }
    }
}

use crate::Chips;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_str() {
        for (s, a) in [
            ("fold", Action::Fold),
            ("check", Action::Check),
            ("call", Action::Call),
            ("raise 40", Action::Raise(40)),
            ("all-in", Action::Shove),
        ] {
            assert_eq!(Action::try_from(s).unwrap(), a);
            assert_eq!(a.to_string(), s);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Action::try_from("raise").is_err());
        assert!(Action::try_from("raise x").is_err());
        assert!(Action::try_from("bet 40").is_err());
    }
}
