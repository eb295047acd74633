use crate::gameplay::Action;
use crate::gameplay::Position;

/// Render the position and its constraints for the suggestion service.
///
/// The legal actions are spelled in their exact wire form; the service is
/// asked to echo one back verbatim, which keeps parsing trivial and makes
/// "almost right" replies fail closed into the fallback.
pub fn prompt(position: &Position) -> String {
    let legal = position
        .legal()
        .iter()
        .map(Action::to_string)
        .collect::<Vec<String>>()
        .join(", ");
    format!(
        "You are playing {}.\n{}\nLegal actions: {}.\nReply with exactly one legal action and nothing else.",
        position.kind(),
        position.describe(),
        legal
    )
}

/// trim, lowercase, and accept only an exact match against the legal set
pub fn accept(position: &Position, reply: &str) -> Option<Action> {
    let reply = reply.trim().to_lowercase();
    position
        .legal()
        .into_iter()
        .find(|action| action.to_string() == reply)
}
