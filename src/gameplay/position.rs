use super::action::Action;
use super::action::Record;
use super::kind::Kind;
use super::outcome::Outcome;
use crate::BJ_SEATS;
use crate::BJ_STAKE;
use crate::blackjack;
use crate::chess;
use crate::holdem;
use serde::Deserialize;
use serde::Serialize;

/// The complete state of one game instance at one point in time, lifted
/// over the three rule engines behind a single contract: enumerate legal
/// actions, apply one to get the successor Position, read the terminal
/// condition.
///
/// Positions are replaced, never mutated, and any Position is derivable
/// by replaying the session's action log over the seeded initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Position {
    Chess(chess::Board),
    Holdem(holdem::Table),
    Blackjack(blackjack::Round),
}

impl Position {
    /// seeded initial state; chess ignores the seed
    pub fn new(kind: Kind, seed: u64) -> Self {
        match kind {
            Kind::Chess => Self::Chess(chess::Board::new()),
            Kind::Holdem => Self::Holdem(holdem::Table::new(seed)),
            Kind::Blackjack => Self::Blackjack(blackjack::Round::new(seed, BJ_SEATS, BJ_STAKE)),
        }
    }

    /// rebuild a Position from the log prefix; the whole log gives the
    /// current position, a shorter prefix gives any historical one
    pub fn replay(kind: Kind, seed: u64, records: &[Record]) -> anyhow::Result<Self> {
        records
            .iter()
            .try_fold(Self::new(kind, seed), |position, record| {
                position.apply(&record.action)
            })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Chess(_) => Kind::Chess,
            Self::Holdem(_) => Kind::Holdem,
            Self::Blackjack(_) => Kind::Blackjack,
        }
    }

    /// every action the seat on turn may take, in wire form order
    pub fn legal(&self) -> Vec<Action> {
        match self {
            Self::Chess(board) => board.legal().into_iter().map(Action::Chess).collect(),
            Self::Holdem(table) => table.legal().into_iter().map(Action::Holdem).collect(),
            Self::Blackjack(round) => round.legal().into_iter().map(Action::Blackjack).collect(),
        }
    }

    pub fn is_allowed(&self, action: &Action) -> bool {
        match (self, action) {
            (Self::Chess(board), Action::Chess(m)) => board.is_allowed(m),
            (Self::Holdem(table), Action::Holdem(a)) => table.is_allowed(a),
            (Self::Blackjack(round), Action::Blackjack(a)) => round.is_allowed(a),
            _ => false,
        }
    }

    /// functional update through the matching rule engine
    pub fn apply(&self, action: &Action) -> anyhow::Result<Self> {
        match (self, action) {
            (Self::Chess(board), Action::Chess(m)) => Ok(Self::Chess(board.apply(*m)?)),
            (Self::Holdem(table), Action::Holdem(a)) => Ok(Self::Holdem(table.apply(*a)?)),
            (Self::Blackjack(round), Action::Blackjack(a)) => {
                Ok(Self::Blackjack(round.apply(*a)?))
            }
            _ => Err(anyhow::anyhow!(
                "{} action sent to {} position",
                action.kind(),
                self.kind()
            )),
        }
    }

    /// terminal condition by rule; the clock and the remote status are
    /// judged upstream and take precedence
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Chess(board) => match board.verdict() {
                chess::Verdict::InPlay => Outcome::InProgress,
                chess::Verdict::Checkmate(side) => Outcome::Winner(side.seat()),
                chess::Verdict::Stalemate => Outcome::Draw,
                chess::Verdict::Draw(_) => Outcome::Draw,
            },
            Self::Holdem(table) => match table.settlement() {
                None => Outcome::InProgress,
                Some(settlement) => match settlement.winner {
                    Some(seat) => Outcome::Winner(seat),
                    None => Outcome::Draw,
                },
            },
            Self::Blackjack(round) => match round.settlement() {
                None => Outcome::InProgress,
                // the session reads the human seat; house seats are scenery
                Some(settlement) => match settlement.results[0] {
                    blackjack::SeatResult::Win | blackjack::SeatResult::Blackjack => {
                        Outcome::Winner(0)
                    }
                    blackjack::SeatResult::Push => Outcome::Draw,
                    blackjack::SeatResult::Lose | blackjack::SeatResult::Bust => Outcome::Winner(1),
                },
            },
        }
    }

    /// raw turn marker: chess side, hold'em seat, blackjack table seat
    pub fn turn(&self) -> Option<usize> {
        match self {
            Self::Chess(board) => match board.verdict() {
                chess::Verdict::InPlay => Some(board.turn().seat()),
                _ => None,
            },
            Self::Holdem(table) => match table.over() {
                true => None,
                false => Some(table.actor()),
            },
            Self::Blackjack(round) => round.turn(),
        }
    }

    /// which of the two session participants is on move; blackjack house
    /// seats and the dealer all count as the opponent
    pub fn mover(&self) -> Option<usize> {
        self.turn().map(|seat| match self {
            Self::Blackjack(_) => usize::from(seat != 0),
            _ => seat,
        })
    }

    /// terminal-friendly rendering for logs and the CLI
    pub fn describe(&self) -> String {
        match self {
            Self::Chess(board) => format!("{}", board),
            Self::Holdem(table) => format!("{}", table),
            Self::Blackjack(round) => format!("{}", round),
        }
    }
}
