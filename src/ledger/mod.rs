pub mod dto;
pub use dto::*;

pub mod http;
pub use http::*;

pub mod memory;
pub use memory::*;

use crate::Username;
use crate::gameplay::Record;
use crate::records::GameRecord;

/// The remote game ledger, reachable only through request/poll calls.
///
/// The ledger is the authoritative record: it serializes actions into the
/// per-session log and decides terminal statuses. There is no push
/// channel; the client learns of anything by fetching. Every mutation is
/// fire-and-forget from the optimistic executor's perspective except the
/// periodic fetch, which is awaited and diffed.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    async fn register(&self, profile: Profile) -> anyhow::Result<()>;
    async fn create_session(&self, request: SessionRequest) -> anyhow::Result<SessionState>;
    async fn session(&self, id: SessionId) -> anyhow::Result<SessionState>;
    async fn submit(&self, id: SessionId, record: Record) -> anyhow::Result<()>;
    async fn resign(&self, id: SessionId, seat: usize) -> anyhow::Result<()>;
    async fn offer_draw(&self, id: SessionId, seat: usize) -> anyhow::Result<()>;
    async fn accept_draw(&self, id: SessionId, seat: usize) -> anyhow::Result<()>;
    async fn claim_timeout(&self, id: SessionId, seat: usize) -> anyhow::Result<()>;
    async fn create_lobby(&self, request: LobbyRequest) -> anyhow::Result<LobbyState>;
    async fn lobby(&self, id: LobbyId) -> anyhow::Result<LobbyState>;
    async fn join_lobby(
        &self,
        id: LobbyId,
        player: Username,
        secret: Option<String>,
    ) -> anyhow::Result<LobbyState>;
    async fn record(&self, record: GameRecord) -> anyhow::Result<()>;
}
