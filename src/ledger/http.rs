use super::Ledger;
use super::dto::*;
use crate::Username;
use crate::gameplay::Record;
use crate::records::GameRecord;
use anyhow::Context;

/// JSON-over-HTTP client for a hosted ledger.
///
/// Thin by design: every method is one request against the gateway, with
/// errors wrapped in enough context to make the skipped-poll and dropped-
/// submission log lines readable. Retry policy lives with the callers
/// (the poller retries by polling, submissions are fire-and-forget).
pub struct HttpLedger {
    base: String,
    web: reqwest::Client,
}

impl HttpLedger {
    pub fn new(base: impl Into<String>) -> anyhow::Result<Self> {
        let web = reqwest::Client::builder()
            .timeout(crate::POLL_INTERVAL)
            .build()
            .context("build http client")?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            web,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn get<T>(&self, path: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.web
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {}", path))?
            .error_for_status()
            .with_context(|| format!("GET {}", path))?
            .json::<T>()
            .await
            .with_context(|| format!("decode {}", path))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> anyhow::Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        self.web
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {}", path))?
            .error_for_status()
            .with_context(|| format!("POST {}", path))?
            .json::<T>()
            .await
            .with_context(|| format!("decode {}", path))
    }

    /// mutations whose response body is irrelevant
    async fn fire<B>(&self, path: &str, body: &B) -> anyhow::Result<()>
    where
        B: serde::Serialize,
    {
        self.web
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {}", path))?
            .error_for_status()
            .with_context(|| format!("POST {}", path))?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct SeatBody {
    seat: usize,
}

#[derive(serde::Serialize)]
struct JoinBody {
    player: Username,
    secret: Option<String>,
}

#[async_trait::async_trait]
impl Ledger for HttpLedger {
    async fn register(&self, profile: Profile) -> anyhow::Result<()> {
        self.fire("register", &profile).await
    }

    async fn create_session(&self, request: SessionRequest) -> anyhow::Result<SessionState> {
        self.post("session", &request).await
    }

    async fn session(&self, id: SessionId) -> anyhow::Result<SessionState> {
        self.get(&format!("session/{}", id)).await
    }

    async fn submit(&self, id: SessionId, record: Record) -> anyhow::Result<()> {
        self.fire(&format!("session/{}/action", id), &record).await
    }

    async fn resign(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.fire(&format!("session/{}/resign", id), &SeatBody { seat })
            .await
    }

    async fn offer_draw(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.fire(&format!("session/{}/offer-draw", id), &SeatBody { seat })
            .await
    }

    async fn accept_draw(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.fire(&format!("session/{}/accept-draw", id), &SeatBody { seat })
            .await
    }

    async fn claim_timeout(&self, id: SessionId, seat: usize) -> anyhow::Result<()> {
        self.fire(&format!("session/{}/claim-timeout", id), &SeatBody { seat })
            .await
    }

    async fn create_lobby(&self, request: LobbyRequest) -> anyhow::Result<LobbyState> {
        self.post("lobby", &request).await
    }

    async fn lobby(&self, id: LobbyId) -> anyhow::Result<LobbyState> {
        self.get(&format!("lobby/{}", id)).await
    }

    async fn join_lobby(
        &self,
        id: LobbyId,
        player: Username,
        secret: Option<String>,
    ) -> anyhow::Result<LobbyState> {
        self.post(&format!("lobby/{}/join", id), &JoinBody { player, secret })
            .await
    }

    async fn record(&self, record: GameRecord) -> anyhow::Result<()> {
        self.fire("record", &record).await
    }
}
