use crate::LOBBY_ATTEMPTS;
use crate::LOBBY_POLL;
use crate::ledger::Ledger;
use crate::ledger::LobbyId;
use crate::ledger::LobbyStatus;
use crate::ledger::SessionId;

/// Why a lobby never turned into a session. All three are actionable:
/// the player can retry, share a new link, or walk away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("lobby was cancelled")]
    Cancelled,
    #[error("lobby expired before an opponent joined")]
    Expired,
    #[error("no opponent joined within {0} polls")]
    Timeout(usize),
}

/// Resolves a shareable lobby identifier to a live session identifier.
///
/// Polls the lobby record on a fixed cadence until it carries a session
/// reference or reports itself dead. Fetch failures count as attempts
/// and are retried, never surfaced. The attempt bound keeps an abandoned
/// link from spinning forever.
pub struct Bridge;

impl Bridge {
    pub async fn resolve(ledger: &dyn Ledger, id: LobbyId) -> Result<SessionId, LobbyError> {
        for attempt in 0..LOBBY_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(LOBBY_POLL).await;
            }
            match ledger.lobby(id).await {
                Err(e) => log::debug!("lobby poll skipped: {}", e),
                Ok(lobby) => match (lobby.session, lobby.status) {
                    (Some(session), _) => return Ok(session),
                    (None, LobbyStatus::Cancelled) => return Err(LobbyError::Cancelled),
                    (None, LobbyStatus::Expired) => return Err(LobbyError::Expired),
                    (None, _) => log::debug!("lobby {} still waiting", id),
                },
            }
        }
        Err(LobbyError::Timeout(LOBBY_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::Kind;
    use crate::ledger::LobbyRequest;
    use crate::ledger::MemoryLedger;
    use std::sync::Arc;
    use std::time::Duration;

    async fn open(ledger: &MemoryLedger) -> LobbyId {
        ledger
            .create_lobby(LobbyRequest {
                creator: "alice".into(),
                kind: Kind::Chess,
                public: true,
                secret: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_once_an_opponent_joins() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let id = open(&ledger).await;
        let joiner = Arc::clone(&ledger);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            joiner.join_lobby(id, "bob".into(), None).await.unwrap();
        });
        let session = Bridge::resolve(ledger.as_ref(), id).await.unwrap();
        let state = ledger.session(session).await.unwrap();
        assert_eq!(state.players, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_lobby_surfaces() {
        let ledger = MemoryLedger::with_seed(1);
        let id = open(&ledger).await;
        ledger.cancel_lobby(id).await.unwrap();
        assert_eq!(
            Bridge::resolve(&ledger, id).await,
            Err(LobbyError::Cancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lobby_surfaces() {
        let ledger = MemoryLedger::with_seed(1);
        let id = open(&ledger).await;
        ledger.expire_lobby(id).await.unwrap();
        assert_eq!(Bridge::resolve(&ledger, id).await, Err(LobbyError::Expired));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_lobby_times_out_after_the_bound() {
        let ledger = MemoryLedger::with_seed(1);
        let id = open(&ledger).await;
        assert_eq!(
            Bridge::resolve(&ledger, id).await,
            Err(LobbyError::Timeout(crate::LOBBY_ATTEMPTS))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failures_are_retried_not_surfaced() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let id = open(&ledger).await;
        ledger.sever();
        let mender = Arc::clone(&ledger);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            mender.mend();
            mender.join_lobby(id, "bob".into(), None).await.unwrap();
        });
        assert!(Bridge::resolve(ledger.as_ref(), id).await.is_ok());
    }
}
