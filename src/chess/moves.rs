/// One chess move in coordinate form.
///
/// Equality ignores the promotion choice so that a UI-selected destination
/// matches the generated legal move; apply resolves the final piece from
/// the explicit choice or the queen default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }
    pub const fn promote(from: Square, to: Square, role: Role) -> Self {
        Self {
            from,
            to,
            promotion: Some(role),
        }
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}
impl Eq for Move {}

/// str isomorphism: "e2e4", "e7e8q"
impl TryFrom<&str> for Move {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        anyhow::ensure!(s.is_ascii(), "invalid move str: {}", s);
        anyhow::ensure!(s.len() == 4 || s.len() == 5, "invalid move str: {}", s);
        let from = Square::try_from(&s[0..2])?;
        let to = Square::try_from(&s[2..4])?;
        let promotion = match s.chars().nth(4) {
            None => None,
            Some(c) => Some(
                Role::promotion(c).ok_or_else(|| anyhow::anyhow!("invalid promotion: {}", c))?,
            ),
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.letter().to_lowercase())?;
        }
        Ok(())
    }
}

use super::piece::Role;
use super::square::Square;
use serde::Deserialize;
use serde::Serialize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_str() {
        let m = Move::try_from("e2e4").unwrap();
        assert_eq!(m.to_string(), "e2e4");
        let p = Move::try_from("e7e8q").unwrap();
        assert_eq!(p.promotion, Some(Role::Queen));
        assert_eq!(p.to_string(), "e7e8q");
    }

    #[test]
    fn equality_ignores_promotion_choice() {
        let a = Move::try_from("e7e8q").unwrap();
        let b = Move::try_from("e7e8n").unwrap();
        assert_eq!(a, b);
    }
}
