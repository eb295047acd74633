use crate::ID;
use crate::Username;
use crate::gameplay::Kind;
use crate::gameplay::Mode;
use crate::gameplay::Record;
use serde::Deserialize;
use serde::Serialize;

pub type SessionId = ID<SessionState>;
pub type LobbyId = ID<LobbyState>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Waiting,
    InProgress,
    Completed,
    Cancelled,
    TimedOut,
}

impl SessionStatus {
    /// a terminal remote status wins over any local not-yet-terminal read
    pub fn terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::TimedOut)
    }
}

/// The remote ledger's full view of one session. The log is append-only
/// and a Position is always derivable by replaying it over the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub kind: Kind,
    pub mode: Mode,
    pub players: Vec<Username>,
    pub seed: u64,
    pub status: SessionStatus,
    pub winner: Option<usize>,
    pub draw_offer: Option<usize>,
    pub log: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub kind: Kind,
    pub mode: Mode,
    pub creator: Username,
    pub opponent: Option<Username>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyStatus {
    Open,
    Full,
    Started,
    Cancelled,
    Expired,
}

/// A shareable waiting room. Once a second player joins, the ledger
/// resolves it to a session id and the record goes inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyState {
    pub id: LobbyId,
    pub creator: Username,
    pub kind: Kind,
    pub public: bool,
    pub secret: Option<String>,
    pub players: Vec<Username>,
    pub session: Option<SessionId>,
    pub status: LobbyStatus,
    /// unix seconds after which joining is refused
    pub expires_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyRequest {
    pub creator: Username,
    pub kind: Kind,
    pub public: bool,
    pub secret: Option<String>,
}

/// What the excluded profile subsystem needs to know about a player.
/// Registration is best-effort; play proceeds whether or not it lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: Username,
    pub address: String,
}
