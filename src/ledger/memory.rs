use super::Ledger;
use super::dto::*;
use crate::Username;
use crate::gameplay::Outcome;
use crate::gameplay::Position;
use crate::gameplay::Record;
use crate::records::GameRecord;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex;

/// seconds an unresolved lobby stays joinable
const LOBBY_TTL: u64 = 300;

/// In-process stand-in for the remote ledger.
///
/// Implements the authority's semantics for real: submissions are
/// validated by replay and serialized into the log, lobbies resolve to
/// sessions when full, terminal statuses stick. Doubles as the offline
/// backend for local play and as the network-free test double; `sever`
/// simulates the link going down so every call fails until `mend`.
pub struct MemoryLedger {
    inner: Mutex<Inner>,
    severed: AtomicBool,
    seed: Option<u64>,
}

#[derive(Default)]
struct Inner {
    profiles: HashMap<Username, Profile>,
    sessions: HashMap<SessionId, SessionState>,
    lobbies: HashMap<LobbyId, LobbyState>,
    records: Vec<GameRecord>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            severed: AtomicBool::new(false),
            seed: None,
        }
    }
}

impl MemoryLedger {
    /// fix the deal seed of every created session, for deterministic tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// drop the simulated network link
    pub fn sever(&self) {
        self.severed.store(true, Ordering::Relaxed);
    }
    /// restore the simulated network link
    pub fn mend(&self) {
        self.severed.store(false, Ordering::Relaxed);
    }

    pub async fn recorded(&self) -> Vec<GameRecord> {
        self.inner.lock().await.records.clone()
    }

    /// test hook: let the opposing seat act directly on the authority,
    /// the way a second client would through its own submission path
    pub async fn force_submit(&self, id: SessionId, record: Record) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        Self::append(&mut inner, id, record)
    }

    /// test hook: cancel a lobby as its creator would
    pub async fn cancel_lobby(&self, id: LobbyId) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        let lobby = inner
            .lobbies
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such lobby: {}", id))?;
        lobby.status = LobbyStatus::Cancelled;
        Ok(())
    }

    /// test hook: age a lobby past its deadline
    pub async fn expire_lobby(&self, id: LobbyId) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        let lobby = inner
            .lobbies
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such lobby: {}", id))?;
        lobby.expires_at = 0;
        Ok(())
    }

    fn online(&self) -> anyhow::Result<()> {
        match self.severed.load(Ordering::Relaxed) {
            true => Err(anyhow::anyhow!("connection refused")),
            false => Ok(()),
        }
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time moves slow")
            .as_secs()
    }

    /// the authority validates by replay before serializing into the log
    fn append(inner: &mut Inner, id: SessionId, record: Record) -> anyhow::Result<()> {
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such session: {}", id))?;
        anyhow::ensure!(
            !session.status.terminal(),
            "session {} already settled",
            id
        );
        // bot-mode logs carry only the human's actions, so they cannot be
        // replay-validated; the session settles through the stats mutation
        if session.mode == crate::gameplay::Mode::Bot {
            session.log.push(record);
            return Ok(());
        }
        let position = Position::replay(session.kind, session.seed, &session.log)?;
        anyhow::ensure!(
            position.is_allowed(&record.action),
            "rejected action: {}",
            record
        );
        let position = position.apply(&record.action)?;
        session.log.push(record);
        session.status = SessionStatus::InProgress;
        match position.outcome() {
            Outcome::InProgress => {}
            Outcome::Winner(seat) => {
                session.status = SessionStatus::Completed;
                session.winner = Some(seat);
            }
            Outcome::Draw => {
                session.status = SessionStatus::Completed;
                session.winner = None;
            }
        }
        Ok(())
    }

    fn open_session(&self, request: SessionRequest) -> SessionState {
        let mut players = vec![request.creator];
        players.extend(request.opponent);
        SessionState {
            id: SessionId::default(),
            kind: request.kind,
            mode: request.mode,
            players,
            seed: self.seed.unwrap_or_else(rand::random),
            status: SessionStatus::InProgress,
            winner: None,
            draw_offer: None,
            log: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Ledger for MemoryLedger {
    async fn register(&self, profile: Profile) -> anyhow::Result<()> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        inner.profiles.insert(profile.username.clone(), profile);
        Ok(())
    }

    async fn create_session(&self, request: SessionRequest) -> anyhow::Result<SessionState> {
        self.online()?;
        let session = self.open_session(request);
        let mut inner = self.inner.lock().await;
        inner.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn session(&self, id: SessionId) -> anyhow::Result<SessionState> {
        self.online()?;
        self.inner
            .lock()
            .await
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such session: {}", id))
    }

    async fn submit(&self, id: SessionId, record: Record) -> anyhow::Result<()> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        Self::append(&mut inner, id, record)
    }

    async fn resign(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such session: {}", id))?;
        if !session.status.terminal() {
            session.status = SessionStatus::Completed;
            session.winner = Some(1 - seat);
        }
        Ok(())
    }

    async fn offer_draw(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such session: {}", id))?;
        session.draw_offer = Some(seat);
        Ok(())
    }

    async fn accept_draw(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such session: {}", id))?;
        // accepting your own offer does nothing
        match session.draw_offer {
            Some(offerer) if offerer != seat && !session.status.terminal() => {
                session.status = SessionStatus::Completed;
                session.winner = None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn claim_timeout(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such session: {}", id))?;
        if !session.status.terminal() {
            session.status = SessionStatus::TimedOut;
            session.winner = Some(seat);
        }
        Ok(())
    }

    async fn create_lobby(&self, request: LobbyRequest) -> anyhow::Result<LobbyState> {
        self.online()?;
        let lobby = LobbyState {
            id: LobbyId::default(),
            creator: request.creator.clone(),
            kind: request.kind,
            public: request.public,
            secret: request.secret,
            players: vec![request.creator],
            session: None,
            status: LobbyStatus::Open,
            expires_at: Self::now() + LOBBY_TTL,
        };
        let mut inner = self.inner.lock().await;
        inner.lobbies.insert(lobby.id, lobby.clone());
        Ok(lobby)
    }

    async fn lobby(&self, id: LobbyId) -> anyhow::Result<LobbyState> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        let lobby = inner
            .lobbies
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("no such lobby: {}", id))?;
        if lobby.status == LobbyStatus::Open && Self::now() > lobby.expires_at {
            lobby.status = LobbyStatus::Expired;
        }
        Ok(lobby.clone())
    }

    async fn join_lobby(
        &self,
        id: LobbyId,
        player: Username,
        secret: Option<String>,
    ) -> anyhow::Result<LobbyState> {
        self.online()?;
        let mut inner = self.inner.lock().await;
        let lobby = inner
            .lobbies
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such lobby: {}", id))?;
        anyhow::ensure!(lobby.status == LobbyStatus::Open, "lobby not joinable");
        anyhow::ensure!(Self::now() <= lobby.expires_at, "lobby expired");
        anyhow::ensure!(
            lobby.public || lobby.secret == secret,
            "wrong lobby secret"
        );
        let session = self.open_session(SessionRequest {
            kind: lobby.kind,
            mode: crate::gameplay::Mode::Peer,
            creator: lobby.creator.clone(),
            opponent: Some(player.clone()),
        });
        let lobby = inner.lobbies.get_mut(&id).expect("lobby fetched above");
        lobby.players.push(player);
        lobby.session = Some(session.id);
        lobby.status = LobbyStatus::Started;
        let resolved = lobby.clone();
        inner.sessions.insert(session.id, session);
        Ok(resolved)
    }

    async fn record(&self, record: GameRecord) -> anyhow::Result<()> {
        self.online()?;
        self.inner.lock().await.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::Action;
    use crate::gameplay::Kind;
    use crate::gameplay::Mode;

    fn request(kind: Kind) -> SessionRequest {
        SessionRequest {
            kind,
            mode: Mode::Peer,
            creator: "alice".into(),
            opponent: Some("bob".into()),
        }
    }

    #[tokio::test]
    async fn submissions_are_validated_and_serialized() {
        let ledger = MemoryLedger::with_seed(1);
        let session = ledger.create_session(request(Kind::Chess)).await.unwrap();
        let good = Record {
            seat: 0,
            action: Action::parse(Kind::Chess, "e2e4").unwrap(),
        };
        let bad = Record {
            seat: 1,
            action: Action::parse(Kind::Chess, "e2e4").unwrap(),
        };
        ledger.submit(session.id, good).await.unwrap();
        assert!(ledger.submit(session.id, bad).await.is_err());
        let remote = ledger.session(session.id).await.unwrap();
        assert_eq!(remote.log.len(), 1);
    }

    #[tokio::test]
    async fn severed_link_fails_every_call() {
        let ledger = MemoryLedger::with_seed(1);
        let session = ledger.create_session(request(Kind::Chess)).await.unwrap();
        ledger.sever();
        assert!(ledger.session(session.id).await.is_err());
        ledger.mend();
        assert!(ledger.session(session.id).await.is_ok());
    }

    #[tokio::test]
    async fn lobby_resolves_to_a_session_when_full() {
        let ledger = MemoryLedger::with_seed(1);
        let lobby = ledger
            .create_lobby(LobbyRequest {
                creator: "alice".into(),
                kind: Kind::Holdem,
                public: true,
                secret: None,
            })
            .await
            .unwrap();
        assert_eq!(lobby.status, LobbyStatus::Open);
        let resolved = ledger
            .join_lobby(lobby.id, "bob".into(), None)
            .await
            .unwrap();
        assert_eq!(resolved.status, LobbyStatus::Started);
        let session = ledger.session(resolved.session.unwrap()).await.unwrap();
        assert_eq!(session.players, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn secret_lobby_rejects_wrong_secret() {
        let ledger = MemoryLedger::with_seed(1);
        let lobby = ledger
            .create_lobby(LobbyRequest {
                creator: "alice".into(),
                kind: Kind::Chess,
                public: false,
                secret: Some("hunter2".into()),
            })
            .await
            .unwrap();
        assert!(
            ledger
                .join_lobby(lobby.id, "mallory".into(), Some("guess".into()))
                .await
                .is_err()
        );
        assert!(
            ledger
                .join_lobby(lobby.id, "bob".into(), Some("hunter2".into()))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn draw_needs_the_other_seat() {
        let ledger = MemoryLedger::with_seed(1);
        let session = ledger.create_session(request(Kind::Chess)).await.unwrap();
        ledger.offer_draw(session.id, 0).await.unwrap();
        ledger.accept_draw(session.id, 0).await.unwrap();
        assert!(!ledger.session(session.id).await.unwrap().status.terminal());
        ledger.accept_draw(session.id, 1).await.unwrap();
        let remote = ledger.session(session.id).await.unwrap();
        assert_eq!(remote.status, SessionStatus::Completed);
        assert_eq!(remote.winner, None);
    }

    #[tokio::test]
    async fn resignation_awards_the_opponent() {
        let ledger = MemoryLedger::with_seed(1);
        let session = ledger.create_session(request(Kind::Chess)).await.unwrap();
        ledger.resign(session.id, 0).await.unwrap();
        let remote = ledger.session(session.id).await.unwrap();
        assert_eq!(remote.status, SessionStatus::Completed);
        assert_eq!(remote.winner, Some(1));
    }
}
