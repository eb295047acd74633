/// A board square 0..64, a1 = 0, h8 = 63.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    pub fn all() -> impl Iterator<Item = Self> {
        (0..64u8).map(Self)
    }
    /// 0..8, a = 0
    pub fn file(&self) -> i8 {
        (self.0 % 8) as i8
    }
    /// 0..8, rank 1 = 0
    pub fn rank(&self) -> i8 {
        (self.0 / 8) as i8
    }
    /// step by file/rank deltas, None when it walks off the board
    pub fn offset(&self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file() + df;
        let rank = self.rank() + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self((rank * 8 + file) as u8))
        } else {
            None
        }
    }
}

/// u8 isomorphism
impl From<Square> for u8 {
    fn from(s: Square) -> u8 {
        s.0
    }
}
impl From<u8> for Square {
    fn from(n: u8) -> Self {
        assert!(n < 64, "invalid square u8: {}", n);
        Self(n)
    }
}

/// str isomorphism: "e4"
impl TryFrom<&str> for Square {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut chars = s.chars();
        let file = chars
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty square str"))?;
        let rank = chars
            .next()
            .ok_or_else(|| anyhow::anyhow!("square str missing rank: {}", s))?;
        anyhow::ensure!(chars.next().is_none(), "square str too long: {}", s);
        anyhow::ensure!(('a'..='h').contains(&file), "invalid file: {}", file);
        anyhow::ensure!(('1'..='8').contains(&rank), "invalid rank: {}", rank);
        let file = file as u8 - b'a';
        let rank = rank as u8 - b'1';
        Ok(Self(rank * 8 + file))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + (self.file() as u8)) as char,
            self.rank() + 1
        )
    }
}

use serde::Deserialize;
use serde::Serialize;
