/// Hand is an unordered set of cards packed into a u64, one bit per card
/// of the 52-card deck in `Card`'s u8 order. Only hand evaluation uses
/// this representation; dealt piles that may repeat cards (the blackjack
/// shoe) live in Deck as ordered vectors.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hand(u64);

impl Hand {
    pub fn empty() -> Self {
        Self(0)
    }
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn contains(&self, card: &Card) -> bool {
        self.0 & u64::from(*card) != 0
    }
    /// the subset of this hand wearing one suit
    pub fn of(&self, suit: &Suit) -> Hand {
        Self(self.0 & u64::from(*suit))
    }
    pub fn push(&mut self, card: Card) {
        self.0 |= u64::from(card);
    }

    const fn mask() -> u64 {
        (1 << 52) - 1
    }
}

/// u64 isomorphism
impl From<u64> for Hand {
    fn from(n: u64) -> Self {
        Self(n & Self::mask())
    }
}
impl From<Hand> for u64 {
    fn from(h: Hand) -> Self {
        h.0
    }
}

/// Vec<Card> isomorphism (up to permutation, this always comes out sorted)
impl From<Hand> for Vec<Card> {
    fn from(h: Hand) -> Self {
        (0..52u8)
            .filter(|i| h.0 & (1 << i) != 0)
            .map(Card::from)
            .collect()
    }
}
impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self::from(cards.as_slice())
    }
}
impl From<&[Card]> for Hand {
    fn from(cards: &[Card]) -> Self {
        let mut hand = Self::empty();
        for card in cards {
            hand.push(*card);
        }
        hand
    }
}

/// collapse each rank's four suit bits into one bit of a 13-wide mask
impl From<Hand> for u16 {
    fn from(h: Hand) -> Self {
        Rank::all()
            .iter()
            .filter(|rank| h.0 & u64::from(**rank) != 0)
            .map(|rank| u16::from(*rank))
            .fold(0, |mask, bit| mask | bit)
    }
}

/// str isomorphism, whitespace separated: "As Kh Qd"
impl TryFrom<&str> for Hand {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Ok(Self::from(
            s.split_whitespace()
                .map(Card::try_from)
                .collect::<Result<Vec<Card>, _>>()?,
        ))
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in Vec::<Card>::from(*self) {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}

use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use serde::Deserialize;
use serde::Serialize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u64() {
        let hand = Hand::try_from("Jc Ts 2c Js").unwrap();
        assert_eq!(hand, Hand::from(u64::from(hand)));
    }

    #[test]
    fn ranks_in_suit() {
        let hand = Hand::try_from("2c 3d 4h 5s 6c 7d 8h 9s Tc Jd Qh Ks Ac").unwrap();
        assert_eq!(u16::from(hand.of(&Suit::Club)), 0b_1000100010001);
        assert_eq!(u16::from(hand.of(&Suit::Diamond)), 0b_0001000100010);
        assert_eq!(u16::from(hand.of(&Suit::Heart)), 0b_0010001000100);
        assert_eq!(u16::from(hand.of(&Suit::Spade)), 0b_0100010001000);
    }

    #[test]
    fn rank_mask_merges_suits() {
        let hand = Hand::try_from("As Ah Ad Ac Ks").unwrap();
        assert_eq!(u16::from(hand), 0b_1100000000000);
    }

    #[test]
    fn cards_come_out_sorted() {
        let hand = Hand::try_from("Jc Ts 2c Js").unwrap();
        let cards = Vec::<Card>::from(hand);
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0], Card::try_from("2c").unwrap());
        assert_eq!(cards[3], Card::try_from("Js").unwrap());
    }

    #[test]
    fn membership() {
        let hand = Hand::try_from("As 2h").unwrap();
        assert!(hand.contains(&Card::try_from("As").unwrap()));
        assert!(!hand.contains(&Card::try_from("2c").unwrap()));
    }
}
