use super::card::Card;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

/// An ordered pile of cards dealt from the top.
///
/// The order is fixed by the seed at construction and the pile is carried
/// inside the Position, so replaying a session's action log reproduces
/// every deal without re-rolling randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// One 52-card deck in seeded shuffle order.
    pub fn shuffled(seed: u64) -> Self {
        let mut cards = (0..52u8).map(Card::from).collect::<Vec<Card>>();
        cards.shuffle(&mut SmallRng::seed_from_u64(seed));
        Self(cards)
    }

    /// A blackjack shoe: several decks shuffled together.
    pub fn shoe(seed: u64, decks: usize) -> Self {
        let mut cards = (0..decks)
            .flat_map(|_| (0..52u8).map(Card::from))
            .collect::<Vec<Card>>();
        cards.shuffle(&mut SmallRng::seed_from_u64(seed));
        Self(cards)
    }

    pub fn draw(&mut self) -> Card {
        self.0.pop().expect("deck never runs dry mid-session")
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn remaining(&self) -> usize {
        self.0.len()
    }
}

/// an explicit draw order, drawn from the back; rigged decks in tests
impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards)
    }
}
