use super::hand::Hand;
use super::rank::Rank;
use super::strength::Kickers;
use super::strength::Ranking;
use super::suit::Suit;

/// the wheel: the ace plays under the five
const LOW_STRAIGHT: u16 = 0b_1000000001111;

/// Finds the best five-card reading of a Hand.
///
/// One pass tallies how often each rank appears; flushes and straights
/// come from the packed suit and rank masks. Categories are tried from
/// strongest down, so the first hit is the hand's value.
pub struct Evaluator(Hand);

impl From<Hand> for Evaluator {
    fn from(h: Hand) -> Self {
        Self(h)
    }
}

impl Evaluator {
    pub fn find_ranking(&self) -> Ranking {
        if let Some(suit) = self.flush_suit() {
            let suited = u16::from(self.0.of(&suit));
            if let Some(high) = Self::straight_high(suited) {
                return Ranking::StraightFlush(high);
            }
        }
        let (quads, trips, pairs) = self.multiples();
        if let Some(rank) = quads.first() {
            return Ranking::FourOAK(*rank);
        }
        if let Some(triple) = trips.first() {
            let filler = trips
                .get(1)
                .into_iter()
                .chain(pairs.first())
                .max()
                .copied();
            if let Some(pair) = filler {
                return Ranking::FullHouse(*triple, pair);
            }
        }
        if let Some(suit) = self.flush_suit() {
            return Ranking::Flush(Rank::from(u16::from(self.0.of(&suit))));
        }
        if let Some(high) = Self::straight_high(self.ranks()) {
            return Ranking::Straight(high);
        }
        if let Some(triple) = trips.first() {
            return Ranking::ThreeOAK(*triple);
        }
        match pairs.as_slice() {
            [hi, lo, ..] => Ranking::TwoPair(*hi, *lo),
            [hi] => Ranking::OnePair(*hi),
            [] => Ranking::HighCard(Rank::from(self.ranks())),
        }
    }

    /// the highest spare ranks left over once the category took its due
    pub fn find_kickers(&self, ranking: Ranking) -> Kickers {
        match ranking.n_kickers() {
            0 => Kickers::from(0),
            keep => {
                let mut spare = self.ranks() & ranking.mask();
                while spare.count_ones() as usize > keep {
                    spare &= spare - 1;
                }
                Kickers::from(spare)
            }
        }
    }

    //

    fn ranks(&self) -> u16 {
        u16::from(self.0)
    }

    /// ranks held four, three, and two times over, best first
    fn multiples(&self) -> (Vec<Rank>, Vec<Rank>, Vec<Rank>) {
        let cards = u64::from(self.0);
        let mut quads = Vec::new();
        let mut trips = Vec::new();
        let mut pairs = Vec::new();
        for rank in Rank::all().iter().rev() {
            match (cards & u64::from(*rank)).count_ones() {
                4 => quads.push(*rank),
                3 => trips.push(*rank),
                2 => pairs.push(*rank),
                _ => {}
            }
        }
        (quads, trips, pairs)
    }

    fn flush_suit(&self) -> Option<Suit> {
        Suit::all()
            .iter()
            .find(|suit| self.0.of(suit).count() >= 5)
            .copied()
    }

    /// top rank of a five-long run in a 13-bit rank mask, wheel included
    fn straight_high(ranks: u16) -> Option<Rank> {
        let run = ranks & ranks << 1 & ranks << 2 & ranks << 3 & ranks << 4;
        if run > 0 {
            Some(Rank::from(run))
        } else if LOW_STRAIGHT & ranks == LOW_STRAIGHT {
            Some(Rank::Five)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> (Ranking, Kickers) {
        let eval = Evaluator::from(Hand::try_from(s).unwrap());
        let ranking = eval.find_ranking();
        let kickers = eval.find_kickers(ranking);
        (ranking, kickers)
    }

    #[test]
    fn high_card() {
        let (ranking, kickers) = eval("As Kh Qd Jc 9s");
        assert_eq!(ranking, Ranking::HighCard(Rank::Ace));
        assert_eq!(
            kickers,
            Kickers::from(vec![Rank::King, Rank::Queen, Rank::Jack, Rank::Nine])
        );
    }

    #[test]
    fn one_pair() {
        let (ranking, kickers) = eval("As Ah Kd Qc Js");
        assert_eq!(ranking, Ranking::OnePair(Rank::Ace));
        assert_eq!(
            kickers,
            Kickers::from(vec![Rank::King, Rank::Queen, Rank::Jack])
        );
    }

    #[test]
    fn two_pair() {
        let (ranking, kickers) = eval("As Ah Kd Kc Qs");
        assert_eq!(ranking, Ranking::TwoPair(Rank::Ace, Rank::King));
        assert_eq!(kickers, Kickers::from(vec![Rank::Queen]));
    }

    #[test]
    fn three_oak() {
        let (ranking, kickers) = eval("As Ah Ad Kc Qs");
        assert_eq!(ranking, Ranking::ThreeOAK(Rank::Ace));
        assert_eq!(kickers, Kickers::from(vec![Rank::King, Rank::Queen]));
    }

    #[test]
    fn straight() {
        let (ranking, kickers) = eval("Ts Jh Qd Kc As");
        assert_eq!(ranking, Ranking::Straight(Rank::Ace));
        assert_eq!(kickers, Kickers::from(vec![]));
    }

    #[test]
    fn flush() {
        let (ranking, _) = eval("As Ks Qs Js 9s");
        assert_eq!(ranking, Ranking::Flush(Rank::Ace));
    }

    #[test]
    fn full_house() {
        let (ranking, _) = eval("2s 2h 2d 3c 3s");
        assert_eq!(ranking, Ranking::FullHouse(Rank::Two, Rank::Three));
    }

    #[test]
    fn four_oak() {
        let (ranking, kickers) = eval("As Ah Ad Ac Ks");
        assert_eq!(ranking, Ranking::FourOAK(Rank::Ace));
        assert_eq!(kickers, Kickers::from(vec![Rank::King]));
    }

    #[test]
    fn straight_flush() {
        let (ranking, _) = eval("Ts Js Qs Ks As");
        assert_eq!(ranking, Ranking::StraightFlush(Rank::Ace));
    }

    #[test]
    fn wheel_straight() {
        let (ranking, _) = eval("As 2h 3d 4c 5s");
        assert_eq!(ranking, Ranking::Straight(Rank::Five));
    }

    #[test]
    fn wheel_straight_flush() {
        let (ranking, _) = eval("As 2s 3s 4s 5s");
        assert_eq!(ranking, Ranking::StraightFlush(Rank::Five));
    }

    #[test]
    fn seven_card_hand() {
        let (ranking, kickers) = eval("As Ah Kd Kc Qs Jh 9d");
        assert_eq!(ranking, Ranking::TwoPair(Rank::Ace, Rank::King));
        assert_eq!(kickers, Kickers::from(vec![Rank::Queen]));
    }

    #[test]
    fn flush_over_straight() {
        let (ranking, _) = eval("4h 6h 7h 8h 9h Ts");
        assert_eq!(ranking, Ranking::Flush(Rank::Nine));
    }

    #[test]
    fn full_house_over_flush() {
        let (ranking, _) = eval("Kh Ah Ad As Ks Qs Js 9s");
        assert_eq!(ranking, Ranking::FullHouse(Rank::Ace, Rank::King));
    }

    #[test]
    fn three_pair_reports_best_two() {
        let (ranking, kickers) = eval("As Ah Kd Kc Qs Qh Jd");
        assert_eq!(ranking, Ranking::TwoPair(Rank::Ace, Rank::King));
        assert_eq!(kickers, Kickers::from(vec![Rank::Queen]));
    }

    #[test]
    fn two_trips_report_full_house() {
        let (ranking, _) = eval("As Ah Ad Kc Ks Kh Qd");
        assert_eq!(ranking, Ranking::FullHouse(Rank::Ace, Rank::King));
    }

    #[test]
    fn trips_beside_a_pair_make_a_full_house() {
        let (ranking, _) = eval("As Ah Ad 2c 2s Kh Qd");
        assert_eq!(ranking, Ranking::FullHouse(Rank::Ace, Rank::Two));
    }
}
