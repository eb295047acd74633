use crate::Username;
use crate::gameplay::Kind;
use serde::Deserialize;
use serde::Serialize;

/// What the core emits toward the profile subsystem when a session ends.
/// Best-effort: a failed emission is logged and never blocks teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub kind: Kind,
    pub player: Username,
    /// None on a draw
    pub won: Option<bool>,
    pub moves: u32,
}

/// fire the stats mutation and swallow any failure
pub async fn report(ledger: &dyn crate::ledger::Ledger, record: GameRecord) {
    if let Err(e) = ledger.record(record.clone()).await {
        log::warn!("stats report dropped for {}: {}", record.player, e);
    }
}
