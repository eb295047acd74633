use super::action::Action;
use super::stage::Stage;
use crate::B_BLIND;
use crate::Chips;
use crate::S_BLIND;
use crate::STACK;
use crate::cards::Card;
use crate::cards::Deck;
use crate::cards::Hand;
use crate::cards::Strength;
use serde::Deserialize;
use serde::Serialize;

/// Where the chips land once a hand is over.
///
/// Payouts are gross returns per seat: uncalled excess refunded first,
/// then the matched pot awarded to the winner or split. A split floors
/// the half-pot and hands the remainder to the acting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub winner: Option<usize>,
    pub payouts: [Chips; 2],
}

impl Settlement {
    pub fn split(pot: Chips, actor: usize) -> [Chips; 2] {
        let mut payouts = [pot / 2, pot / 2];
        payouts[actor] += pot % 2;
        payouts
    }
}

/// Heads-up no-limit hold'em hand state.
///
/// The seeded deck rides inside the state so that replaying the action
/// log out of the remote record reproduces every deal. Betting follows
/// the linear street machine PreFlop -> Flop -> Turn -> River -> Showdown;
/// an all-in closes betting and fast-forwards the remaining streets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    holes: [[Card; 2]; 2],
    community: Vec<Card>,
    deck: Deck,
    stage: Stage,
    pot: Chips,
    bets: [Chips; 2],
    spent: [Chips; 2],
    stacks: [Chips; 2],
    dealer: usize,
    actor: usize,
    folded: Option<usize>,
    shoved: [bool; 2],
    acted: [bool; 2],
    current: Chips,
    min_raise: Chips,
}

impl Table {
    pub fn new(seed: u64) -> Self {
        Self::with_deck(Deck::shuffled(seed))
    }

    /// dealer posts the small blind and acts first preflop
    pub fn with_deck(mut deck: Deck) -> Self {
        let holes = [[deck.draw(), deck.draw()], [deck.draw(), deck.draw()]];
        let dealer = 0;
        let mut table = Self {
            holes,
            community: Vec::with_capacity(5),
            deck,
            stage: Stage::PreFlop,
            pot: 0,
            bets: [0; 2],
            spent: [0; 2],
            stacks: [STACK; 2],
            dealer,
            actor: dealer,
            folded: None,
            shoved: [false; 2],
            acted: [false; 2],
            current: B_BLIND,
            min_raise: B_BLIND,
        };
        table.post(dealer, S_BLIND);
        table.post(1 - dealer, B_BLIND);
        table
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn actor(&self) -> usize {
        self.actor
    }
    pub fn hole(&self, seat: usize) -> &[Card; 2] {
        &self.holes[seat]
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn stack(&self, seat: usize) -> Chips {
        self.stacks[seat]
    }
    pub fn over(&self) -> bool {
        self.folded.is_some() || self.stage == Stage::Showdown
    }
    pub fn to_call(&self) -> Chips {
        self.current - self.bets[self.actor]
    }
    /// inclusive raise-amount range open to the actor, None when raising is off
    pub fn raise_bounds(&self) -> Option<(Chips, Chips)> {
        match self.may_raise() {
            true => Some((self.min_raise, self.stacks[self.actor] - self.to_call() - 1)),
            false => None,
        }
    }

    pub fn legal(&self) -> Vec<Action> {
        let mut options = Vec::new();
        if self.over() {
            return options;
        }
        if self.may_raise() {
            options.push(Action::Raise(self.min_raise));
        }
        if self.stacks[self.actor] > 0 {
            options.push(Action::Shove);
        }
        if self.to_call() > 0 && self.to_call() < self.stacks[self.actor] {
            options.push(Action::Call);
        }
        if self.to_call() > 0 {
            options.push(Action::Fold);
        } else {
            options.push(Action::Check);
        }
        options
    }

    pub fn is_allowed(&self, action: &Action) -> bool {
        match action {
            Action::Raise(amount) => {
                self.may_raise()
                    && *amount >= self.min_raise
                    && self.to_call() + *amount < self.stacks[self.actor]
            }
            _ => self.legal().contains(action),
        }
    }

    /// functional update: validate, then produce the successor state
    pub fn apply(&self, action: Action) -> anyhow::Result<Self> {
        anyhow::ensure!(self.is_allowed(&action), "illegal action: {}", action);
        let mut child = self.clone();
        child.act(action);
        child.roll();
        Ok(child)
    }

    pub fn strength(&self, seat: usize) -> Strength {
        let mut cards = self.holes[seat].to_vec();
        cards.extend_from_slice(&self.community);
        Strength::from(Hand::from(cards))
    }

    pub fn settlement(&self) -> Option<Settlement> {
        if !self.over() {
            return None;
        }
        let matched = 2 * self.spent[0].min(self.spent[1]);
        let refund = [
            self.spent[0] - self.spent[0].min(self.spent[1]),
            self.spent[1] - self.spent[0].min(self.spent[1]),
        ];
        let winner = match self.folded {
            Some(quitter) => Some(1 - quitter),
            None => match self.strength(0).cmp(&self.strength(1)) {
                std::cmp::Ordering::Greater => Some(0),
                std::cmp::Ordering::Less => Some(1),
                std::cmp::Ordering::Equal => None,
            },
        };
        let mut payouts = match winner {
            Some(w) => {
                let mut p = [0; 2];
                p[w] = matched;
                p
            }
            None => Settlement::split(matched, self.actor),
        };
        payouts[0] += refund[0];
        payouts[1] += refund[1];
        Some(Settlement { winner, payouts })
    }
}

impl Table {
    fn may_raise(&self) -> bool {
        !self.shoved[1 - self.actor] && self.to_call() + self.min_raise < self.stacks[self.actor]
    }

    /// blinds go in before anyone has acted, so the big blind keeps its option
    fn post(&mut self, seat: usize, blind: Chips) {
        let amount = blind.min(self.stacks[seat]);
        self.stacks[seat] -= amount;
        self.bets[seat] += amount;
        self.spent[seat] += amount;
        self.pot += amount;
    }

    fn put(&mut self, seat: usize, amount: Chips) {
        let amount = amount.min(self.stacks[seat]);
        self.stacks[seat] -= amount;
        self.bets[seat] += amount;
        self.spent[seat] += amount;
        self.pot += amount;
        if self.stacks[seat] == 0 {
            self.shoved[seat] = true;
        }
    }

    fn act(&mut self, action: Action) {
        let seat = self.actor;
        match action {
            Action::Fold => self.folded = Some(seat),
            Action::Check => {}
            Action::Call => self.put(seat, self.to_call()),
            Action::Raise(amount) => {
                self.put(seat, self.to_call() + amount);
                self.current = self.bets[seat];
                self.min_raise = amount;
                self.acted[1 - seat] = false;
            }
            Action::Shove => {
                self.put(seat, self.stacks[seat]);
                if self.bets[seat] > self.current {
                    self.min_raise = self.bets[seat] - self.current;
                    self.current = self.bets[seat];
                    self.acted[1 - seat] = false;
                }
            }
        }
        self.acted[seat] = true;
    }

    fn roll(&mut self) {
        if self.folded.is_some() {
            return;
        }
        if !self.closed() {
            self.actor = 1 - self.actor;
            return;
        }
        // an all-in keeps the round closed, dealing straight to showdown
        while self.stage != Stage::Showdown && self.closed() {
            self.next_street();
        }
    }

    fn closed(&self) -> bool {
        match (self.shoved[0], self.shoved[1]) {
            (true, true) => true,
            (true, false) => self.bets[1] >= self.bets[0],
            (false, true) => self.bets[0] >= self.bets[1],
            (false, false) => self.acted[0] && self.acted[1] && self.bets[0] == self.bets[1],
        }
    }

    fn next_street(&mut self) {
        self.stage = self.stage.next();
        for _ in 0..self.stage.reveals() {
            let card = self.deck.draw();
            self.community.push(card);
        }
        self.bets = [0; 2];
        self.current = 0;
        self.min_raise = B_BLIND;
        self.acted = [false; 2];
        self.actor = 1 - self.dealer;
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} pot {:>5} | board",
            format!("{:<8}", self.stage.to_string()).bright_green(),
            self.pot
        )?;
        for card in self.community.iter() {
            write!(f, " {}", card)?;
        }
        Ok(())
    }
}

use colored::Colorize;

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        Card::try_from(s).unwrap()
    }

    /// draw order: both holes, then flop, turn, river off the back
    fn rigged(drawn: &[&str]) -> Table {
        let mut cards = drawn.iter().map(|s| card(s)).collect::<Vec<Card>>();
        cards.reverse();
        let rest = (0..52u8)
            .map(Card::from)
            .filter(|c| !cards.contains(c))
            .collect::<Vec<Card>>();
        let deck = rest.into_iter().chain(cards).collect::<Vec<Card>>();
        Table::with_deck(Deck::from(deck))
    }

    #[test]
    fn blinds_are_posted() {
        let table = Table::new(0);
        assert_eq!(table.pot(), S_BLIND + B_BLIND);
        assert_eq!(table.stack(0), STACK - S_BLIND);
        assert_eq!(table.stack(1), STACK - B_BLIND);
        assert_eq!(table.actor(), 0);
        assert_eq!(table.stage(), Stage::PreFlop);
    }

    #[test]
    fn small_blind_faces_a_call() {
        let table = Table::new(0);
        let legal = table.legal();
        assert!(legal.contains(&Action::Call));
        assert!(legal.contains(&Action::Fold));
        assert!(legal.contains(&Action::Shove));
        assert!(!legal.contains(&Action::Check));
    }

    #[test]
    fn fold_awards_pot_immediately() {
        let table = Table::new(0).apply(Action::Fold).unwrap();
        assert!(table.over());
        let settlement = table.settlement().unwrap();
        assert_eq!(settlement.winner, Some(1));
        assert_eq!(settlement.payouts, [0, S_BLIND + B_BLIND + S_BLIND]);
    }

    #[test]
    fn big_blind_keeps_the_option() {
        // a flat call must not end the preflop round
        let table = Table::new(0).apply(Action::Call).unwrap();
        assert_eq!(table.stage(), Stage::PreFlop);
        assert_eq!(table.actor(), 1);
        assert!(table.legal().contains(&Action::Check));
        let table = table.apply(Action::Check).unwrap();
        assert_eq!(table.stage(), Stage::Flop);
        assert_eq!(table.community().len(), 3);
    }

    #[test]
    fn streets_advance_in_order() {
        let mut table = Table::new(0).apply(Action::Call).unwrap();
        table = table.apply(Action::Check).unwrap();
        assert_eq!(table.stage(), Stage::Flop);
        table = table.apply(Action::Check).unwrap();
        table = table.apply(Action::Check).unwrap();
        assert_eq!(table.stage(), Stage::Turn);
        assert_eq!(table.community().len(), 4);
        table = table.apply(Action::Check).unwrap();
        table = table.apply(Action::Check).unwrap();
        assert_eq!(table.stage(), Stage::River);
        assert_eq!(table.community().len(), 5);
        table = table.apply(Action::Check).unwrap();
        table = table.apply(Action::Check).unwrap();
        assert_eq!(table.stage(), Stage::Showdown);
        assert!(table.over());
    }

    #[test]
    fn raise_reopens_action() {
        let table = Table::new(0).apply(Action::Call).unwrap();
        let table = table.apply(Action::Raise(B_BLIND)).unwrap();
        assert_eq!(table.stage(), Stage::PreFlop);
        assert_eq!(table.actor(), 0);
        assert_eq!(table.to_call(), B_BLIND);
    }

    #[test]
    fn undersized_raise_is_rejected() {
        let table = Table::new(0);
        assert!(table.apply(Action::Raise(B_BLIND - 1)).is_err());
        assert!(table.apply(Action::Raise(B_BLIND)).is_ok());
    }

    #[test]
    fn all_in_call_deals_out_the_board() {
        let table = Table::new(0).apply(Action::Shove).unwrap();
        assert_eq!(table.stage(), Stage::PreFlop);
        // covering an all-in with an equal stack is itself an all-in
        assert!(!table.legal().contains(&Action::Call));
        let table = table.apply(Action::Shove).unwrap();
        assert_eq!(table.stage(), Stage::Showdown);
        assert_eq!(table.community().len(), 5);
        assert!(table.over());
        assert!(table.settlement().is_some());
    }

    #[test]
    fn uncalled_raise_is_refunded() {
        let table = Table::new(0).apply(Action::Raise(40)).unwrap();
        let table = table.apply(Action::Fold).unwrap();
        let settlement = table.settlement().unwrap();
        // raiser put in 60, the folder 20: 40 comes back, 40 matched pot won
        assert_eq!(settlement.winner, Some(0));
        assert_eq!(settlement.payouts, [80, 0]);
    }

    #[test]
    fn aces_beat_kings_on_a_fixed_board() {
        // the paired board gives both seats two pair, pocket pair on top
        let table = rigged(&[
            "As", "Ah", "Ks", "Kh", // holes
            "2c", "7d", "9h", // flop
            "2s", // turn
            "9c", // river
        ]);
        let table = table.apply(Action::Call).unwrap();
        let mut table = table.apply(Action::Check).unwrap();
        for _ in 0..3 {
            table = table.apply(Action::Check).unwrap();
            table = table.apply(Action::Check).unwrap();
        }
        let settlement = table.settlement().unwrap();
        assert_eq!(settlement.winner, Some(0));
        assert_eq!(settlement.payouts, [2 * B_BLIND, 0]);
    }

    #[test]
    fn identical_hands_split_the_pot() {
        // both play the board: broadway straight on board
        let table = rigged(&[
            "2s", "3h", "2d", "3c", // holes, all dead
            "Ts", "Jh", "Qd", // flop
            "Kc", // turn
            "Ah", // river
        ]);
        let table = table.apply(Action::Call).unwrap();
        let mut table = table.apply(Action::Check).unwrap();
        for _ in 0..3 {
            table = table.apply(Action::Check).unwrap();
            table = table.apply(Action::Check).unwrap();
        }
        let settlement = table.settlement().unwrap();
        assert_eq!(settlement.winner, None);
        assert_eq!(settlement.payouts, [B_BLIND, B_BLIND]);
    }

    #[test]
    fn odd_split_remainder_is_deterministic() {
        assert_eq!(Settlement::split(31, 0), [16, 15]);
        assert_eq!(Settlement::split(31, 1), [15, 16]);
        assert_eq!(Settlement::split(30, 1), [15, 15]);
    }

    #[test]
    fn seeded_deal_is_reproducible() {
        let a = Table::new(99);
        let b = Table::new(99);
        assert_eq!(a.hole(0), b.hole(0));
        assert_eq!(a.hole(1), b.hole(1));
    }

    #[test]
    fn rigged_deck_deals_as_scripted() {
        let table = rigged(&["As", "Ah", "Ks", "Kh", "2c", "7d", "9h", "2s", "9c"]);
        assert_eq!(table.hole(0), &[card("As"), card("Ah")]);
        assert_eq!(table.hole(1), &[card("Ks"), card("Kh")]);
    }
}
