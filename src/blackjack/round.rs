use super::action::Action;
use super::score::Score;
use super::score::natural;
use crate::BJ_BANKROLL;
use crate::BJ_DECKS;
use crate::BJ_STAND;
use crate::Chips;
use crate::cards::Card;
use crate::cards::Deck;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Stood,
    Busted,
    Natural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatResult {
    Win,
    Lose,
    Push,
    Blackjack,
    Bust,
}

/// One seat at the table: its cards, its stake, and what is left of its
/// bankroll (the headroom that decides whether doubling is affordable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    cards: Vec<Card>,
    bet: Chips,
    chips: Chips,
    status: Status,
}

impl Seat {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn score(&self) -> Score {
        Score::from(self.cards.as_slice())
    }
}

/// What each seat gets back once the dealer has played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub results: Vec<SeatResult>,
    pub payouts: Vec<Chips>,
}

/// One multi-seat blackjack round against the house.
///
/// Seat 0 is the human; the remaining seats are house bots driven through
/// the same action interface. Naturals are marked before anyone draws.
/// The dealer acts automatically once the last seat resolves, drawing on
/// anything below 17 and on soft 17, then the round settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    seats: Vec<Seat>,
    dealer: Vec<Card>,
    shoe: Deck,
    turn: usize,
    done: bool,
}

impl Round {
    pub fn new(seed: u64, seats: usize, stake: Chips) -> Self {
        Self::with_shoe(Deck::shoe(seed, BJ_DECKS), seats, stake)
    }

    pub fn with_shoe(mut shoe: Deck, seats: usize, stake: Chips) -> Self {
        assert!(seats > 0, "a round needs at least the human seat");
        let seats = (0..seats)
            .map(|_| {
                let cards = vec![shoe.draw(), shoe.draw()];
                let status = if natural(&cards) {
                    Status::Natural
                } else {
                    Status::Playing
                };
                Seat {
                    cards,
                    bet: stake,
                    chips: BJ_BANKROLL - stake,
                    status,
                }
            })
            .collect::<Vec<Seat>>();
        let dealer = vec![shoe.draw(), shoe.draw()];
        let mut round = Self {
            seats,
            dealer,
            shoe,
            turn: 0,
            done: false,
        };
        round.skip_resolved();
        round
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn over(&self) -> bool {
        self.done
    }
    /// the card everyone can see before the dealer reveals
    pub fn upcard(&self) -> Card {
        self.dealer[0]
    }
    /// full dealer hand, only meaningful once the round is over
    pub fn dealer(&self) -> &[Card] {
        &self.dealer
    }
    /// seat whose turn it is, None once the dealer has played
    pub fn turn(&self) -> Option<usize> {
        if self.done { None } else { Some(self.turn) }
    }

    pub fn legal(&self) -> Vec<Action> {
        match self.turn() {
            None => Vec::new(),
            Some(seat) => {
                let seat = &self.seats[seat];
                let mut options = vec![Action::Hit, Action::Stand];
                if seat.cards.len() == 2 && seat.chips >= seat.bet {
                    options.push(Action::Double);
                }
                options
            }
        }
    }

    pub fn is_allowed(&self, action: &Action) -> bool {
        self.legal().contains(action)
    }

    /// functional update: validate, then produce the successor state
    pub fn apply(&self, action: Action) -> anyhow::Result<Self> {
        anyhow::ensure!(self.is_allowed(&action), "illegal action: {}", action);
        let mut child = self.clone();
        child.act(action);
        Ok(child)
    }

    pub fn settlement(&self) -> Option<Settlement> {
        if !self.done {
            return None;
        }
        let dealer = Score::from(self.dealer.as_slice());
        let dealer_natural = natural(&self.dealer);
        let mut results = Vec::with_capacity(self.seats.len());
        let mut payouts = Vec::with_capacity(self.seats.len());
        for seat in self.seats.iter() {
            let (result, payout) = match seat.status {
                Status::Busted => (SeatResult::Bust, 0),
                Status::Natural if dealer_natural => (SeatResult::Push, seat.bet),
                Status::Natural => (SeatResult::Blackjack, seat.bet * 5 / 2),
                _ if dealer_natural => (SeatResult::Lose, 0),
                _ if dealer.busted() => (SeatResult::Win, seat.bet * 2),
                _ => match seat.score().total.cmp(&dealer.total) {
                    std::cmp::Ordering::Greater => (SeatResult::Win, seat.bet * 2),
                    std::cmp::Ordering::Equal => (SeatResult::Push, seat.bet),
                    std::cmp::Ordering::Less => (SeatResult::Lose, 0),
                },
            };
            results.push(result);
            payouts.push(payout);
        }
        Some(Settlement { results, payouts })
    }
}

impl Round {
    fn act(&mut self, action: Action) {
        let turn = self.turn;
        match action {
            Action::Hit => {
                let card = self.shoe.draw();
                let seat = &mut self.seats[turn];
                seat.cards.push(card);
                if seat.score().busted() {
                    seat.status = Status::Busted;
                    self.advance();
                }
            }
            Action::Stand => {
                self.seats[turn].status = Status::Stood;
                self.advance();
            }
            Action::Double => {
                let card = self.shoe.draw();
                let seat = &mut self.seats[turn];
                seat.chips -= seat.bet;
                seat.bet *= 2;
                seat.cards.push(card);
                seat.status = if seat.score().busted() {
                    Status::Busted
                } else {
                    Status::Stood
                };
                self.advance();
            }
        }
    }

    fn advance(&mut self) {
        self.turn += 1;
        self.skip_resolved();
    }

    fn skip_resolved(&mut self) {
        while self.turn < self.seats.len() && self.seats[self.turn].status != Status::Playing {
            self.turn += 1;
        }
        if self.turn >= self.seats.len() && !self.done {
            self.play_dealer();
            self.done = true;
        }
    }

    /// reveal, then draw below the stand line; soft 17 is drawn too
    fn play_dealer(&mut self) {
        loop {
            let score = Score::from(self.dealer.as_slice());
            if score.total < BJ_STAND || (score.total == BJ_STAND && score.soft) {
                let card = self.shoe.draw();
                self.dealer.push(card);
            } else {
                break;
            }
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, seat) in self.seats.iter().enumerate() {
            write!(f, "seat {} [{:>2}]", i, seat.score().total)?;
            for card in seat.cards.iter() {
                write!(f, " {}", card)?;
            }
            writeln!(f)?;
        }
        match self.done {
            true => {
                write!(f, "dealer [{:>2}]", Score::from(self.dealer.as_slice()).total)?;
                for card in self.dealer.iter() {
                    write!(f, " {}", card)?;
                }
                Ok(())
            }
            false => write!(f, "dealer shows {}", self.upcard()),
        }
    }
}
