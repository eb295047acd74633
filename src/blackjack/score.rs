use crate::cards::Card;
use crate::cards::Rank;

/// Blackjack hand arithmetic.
///
/// Every ace starts at eleven and softens to one, one ace at a time,
/// while the total would bust. The hand stays "soft" while an ace still
/// counts eleven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub total: u32,
    pub soft: bool,
}

impl From<&[Card]> for Score {
    fn from(cards: &[Card]) -> Self {
        let mut total = cards.iter().map(|c| c.rank().pips()).sum::<u32>();
        let mut aces = cards.iter().filter(|c| c.rank() == Rank::Ace).count();
        while total > 21 && aces > 0 {
            total -= 10;
            aces -= 1;
        }
        Self {
            total,
            soft: aces > 0,
        }
    }
}

impl Score {
    pub fn busted(&self) -> bool {
        self.total > 21
    }
}

/// twenty-one on the first two cards, paid richer than a regular win
pub fn natural(cards: &[Card]) -> bool {
    cards.len() == 2 && Score::from(cards).total == 21
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace()
            .map(|c| Card::try_from(c).unwrap())
            .collect()
    }

    #[test]
    fn ace_king_is_a_natural_twenty_one() {
        let hand = cards("As Kh");
        let score = Score::from(hand.as_slice());
        assert_eq!(score.total, 21);
        assert!(score.soft);
        assert!(natural(&hand));
    }

    #[test]
    fn aces_soften_instead_of_busting() {
        let hand = cards("As 6h 8d");
        let score = Score::from(hand.as_slice());
        assert_eq!(score.total, 15);
        assert!(!score.soft);
    }

    #[test]
    fn soft_seventeen() {
        let score = Score::from(cards("As 6h").as_slice());
        assert_eq!(score.total, 17);
        assert!(score.soft);
    }

    #[test]
    fn two_aces() {
        let score = Score::from(cards("As Ah").as_slice());
        assert_eq!(score.total, 12);
        assert!(score.soft);
    }

    #[test]
    fn twenty_one_in_three_is_not_natural() {
        assert!(!natural(&cards("7s 7h 7d")));
    }
}
