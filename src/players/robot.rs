use crate::BJ_STAND;
use crate::THINK_DELAY;
use crate::blackjack;
use crate::blackjack::Score;
use crate::gameplay::Action;
use crate::gameplay::Position;
use crate::oracle::Suggest;
use crate::oracle::accept;
use crate::oracle::prompt;
use rand::seq::IndexedRandom;
use std::time::Duration;

/// The bot opponent: asks the oracle for a candidate action, validates it
/// against the legal set, and recovers locally on any failure.
///
/// The fallback never surfaces to the player: a uniformly random legal
/// action for chess and hold'em, the fixed hit-below-17 heuristic for
/// blackjack. The think delay paces moves for the UI; tests run instant.
pub struct Robot {
    oracle: Box<dyn Suggest>,
    think: Duration,
}

impl Robot {
    pub fn new(oracle: Box<dyn Suggest>) -> Self {
        Self {
            oracle,
            think: THINK_DELAY,
        }
    }

    pub fn instant(oracle: Box<dyn Suggest>) -> Self {
        Self {
            oracle,
            think: Duration::ZERO,
        }
    }

    pub async fn decide(&self, position: &Position) -> Action {
        tokio::time::sleep(self.think).await;
        match self.oracle.suggest(&prompt(position)).await {
            Ok(reply) => match accept(position, &reply) {
                Some(action) => action,
                None => {
                    log::debug!("illegal suggestion {:?}, falling back", reply.trim());
                    Self::fallback(position)
                }
            },
            Err(e) => {
                log::debug!("suggestion unavailable ({}), falling back", e);
                Self::fallback(position)
            }
        }
    }

    /// local recovery when the oracle times out, rambles, or cheats
    pub fn fallback(position: &Position) -> Action {
        match position {
            Position::Blackjack(round) => Self::house(round),
            _ => *position
                .legal()
                .choose(&mut rand::rng())
                .expect("fallback only asked on a live position"),
        }
    }

    /// the fixed house heuristic, shared with the blackjack bot seats
    pub fn house(round: &blackjack::Round) -> Action {
        let seat = round.turn().expect("house acts only on a live round");
        let score = Score::from(round.seats()[seat].cards());
        match score.total < BJ_STAND {
            true => Action::Blackjack(blackjack::Action::Hit),
            false => Action::Blackjack(blackjack::Action::Stand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::Kind;
    use crate::oracle::Parrot;

    #[tokio::test]
    async fn accepts_a_legal_echo() {
        let robot = Robot::instant(Box::new(Parrot::say(&["e2e4"])));
        let position = Position::new(Kind::Chess, 0);
        let action = robot.decide(&position).await;
        assert_eq!(action, Action::parse(Kind::Chess, "e2e4").unwrap());
    }

    #[tokio::test]
    async fn garbage_falls_back_to_a_legal_action() {
        let robot = Robot::instant(Box::new(Parrot::say(&["the knight to f3 looks strong"])));
        let position = Position::new(Kind::Chess, 0);
        let action = robot.decide(&position).await;
        assert!(position.legal().contains(&action));
    }

    #[tokio::test]
    async fn illegal_suggestion_falls_back() {
        let robot = Robot::instant(Box::new(Parrot::say(&["e2e5"])));
        let position = Position::new(Kind::Chess, 0);
        let action = robot.decide(&position).await;
        assert!(position.legal().contains(&action));
    }

    #[tokio::test]
    async fn silence_falls_back() {
        let robot = Robot::instant(Box::new(Parrot::mute()));
        let position = Position::new(Kind::Holdem, 3);
        let action = robot.decide(&position).await;
        assert!(position.legal().contains(&action));
    }

    #[tokio::test]
    async fn blackjack_fallback_hits_below_seventeen() {
        let robot = Robot::instant(Box::new(Parrot::mute()));
        let position = Position::new(Kind::Blackjack, 5);
        if let (Position::Blackjack(round), Some(seat)) = (&position, position.turn()) {
            let action = robot.decide(&position).await;
            let total = Score::from(round.seats()[seat].cards()).total;
            match total < BJ_STAND {
                true => assert_eq!(action, Action::parse(Kind::Blackjack, "hit").unwrap()),
                false => assert_eq!(action, Action::parse(Kind::Blackjack, "stand").unwrap()),
            }
        }
    }
}
