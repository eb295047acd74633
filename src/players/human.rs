use crate::Chips;
use crate::gameplay::Action;
use crate::gameplay::Kind;
use crate::gameplay::Position;
use crate::holdem;
use dialoguer::Input;
use dialoguer::Select;

/// What the seated human chose: a move, or one of the meta actions that
/// bypass the rule engine and go to the session instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Play(Action),
    Resign,
    OfferDraw,
    AcceptDraw,
}

const META: [(&str, Choice); 3] = [
    ("resign", Choice::Resign),
    ("offer draw", Choice::OfferDraw),
    ("accept draw", Choice::AcceptDraw),
];

/// Terminal-driven decisions for the seated human.
///
/// Blocking by design: the CLI calls this from its own loop and forwards
/// the choice to the session as an optimistic command.
pub struct Human;

impl Human {
    pub fn decide(position: &Position) -> anyhow::Result<Choice> {
        match position {
            Position::Chess(_) => Self::chess(position),
            Position::Holdem(table) => Self::holdem(position, table),
            // no resigning against the house mid-hand
            Position::Blackjack(_) => Self::pick(position, false),
        }
    }

    /// typed coordinate move, or a meta keyword
    fn chess(position: &Position) -> anyhow::Result<Choice> {
        let checked = position.clone();
        let text: String = Input::new()
            .with_prompt("your move (e.g. e2e4; or resign / offer draw / accept draw)")
            .validate_with(move |s: &String| -> Result<(), String> {
                if META.iter().any(|(label, _)| *label == s.as_str()) {
                    return Ok(());
                }
                match Action::parse(Kind::Chess, s) {
                    Ok(action) if checked.is_allowed(&action) => Ok(()),
                    Ok(_) => Err("illegal move".to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .interact_text()?;
        match META.iter().find(|(label, _)| *label == text) {
            Some((_, choice)) => Ok(*choice),
            None => Ok(Choice::Play(Action::parse(Kind::Chess, &text)?)),
        }
    }

    fn holdem(position: &Position, table: &holdem::Table) -> anyhow::Result<Choice> {
        let choice = Self::pick(position, true)?;
        match choice {
            Choice::Play(Action::Holdem(holdem::Action::Raise(_))) => {
                let (min, max) = table.raise_bounds().expect("raise offered as legal");
                let amount: Chips = Input::new()
                    .with_prompt(format!("raise amount [{}-{}]", min, max))
                    .validate_with(move |n: &Chips| -> Result<(), String> {
                        match (min..=max).contains(n) {
                            true => Ok(()),
                            false => Err(format!("amount must be {} to {}", min, max)),
                        }
                    })
                    .interact_text()?;
                Ok(Choice::Play(Action::Holdem(holdem::Action::Raise(amount))))
            }
            choice => Ok(choice),
        }
    }

    fn pick(position: &Position, meta: bool) -> anyhow::Result<Choice> {
        let legal = position.legal();
        let mut choices = legal
            .iter()
            .map(|action| Choice::Play(*action))
            .collect::<Vec<Choice>>();
        let mut labels = legal.iter().map(Action::to_string).collect::<Vec<String>>();
        if meta {
            for (label, choice) in META.iter() {
                labels.push(label.to_string());
                choices.push(*choice);
            }
        }
        let picked = Select::new()
            .with_prompt(position.describe())
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(choices[picked])
    }
}
