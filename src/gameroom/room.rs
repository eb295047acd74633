use super::session::Ending;
use super::session::Session;
use crate::CLOCK_TICK;
use crate::POLL_INTERVAL;
use crate::gameplay::Action;
use crate::gameplay::Mode;
use crate::gameplay::Record;
use crate::ledger::Ledger;
use crate::players::Robot;
use crate::records;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

/// Everything the UI may ask of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// optimistic local action for our seat
    Act(Action),
    /// a blocking modal opened; hold the clock
    Pause,
    Resume,
    Resign,
    OfferDraw,
    AcceptDraw,
}

/// The UI's grip on a Room: a command queue in, a watch of the Session
/// out. Dropping the Handle closes the queue, which tears the Room down
/// and cancels its clock tick and reconciliation poll together.
pub struct Handle {
    commands: UnboundedSender<Command>,
    pub state: watch::Receiver<Session>,
}

impl Handle {
    pub fn send(&self, command: Command) {
        self.commands
            .send(command)
            .map_err(|e| log::warn!("command after teardown: {:?}", e.0))
            .ok();
    }

    pub fn act(&self, action: Action) {
        self.send(Command::Act(action));
    }

    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// wait for the session to reach a terminal state
    pub async fn finished(&mut self) -> Session {
        loop {
            if self.state.borrow().outcome.terminal() {
                return self.state.borrow().clone();
            }
            if self.state.changed().await.is_err() {
                return self.state.borrow().clone();
            }
        }
    }
}

/// Single-writer actor owning one Session's Position.
///
/// Local optimistic acts, reconciliation replays, clock ticks and bot
/// moves are serialized onto this one task; nothing else ever touches the
/// Position, so replay can never interleave with an apply on a stale
/// base. Two timers run here, the 1 Hz clock tick and the fixed-interval
/// poll; both die with the task. Cancellation is cooperative: an
/// in-flight fetch or submission is simply ignored once the Room is gone.
pub struct Room {
    session: Session,
    ledger: Arc<dyn Ledger>,
    robot: Option<Robot>,
    commands: UnboundedReceiver<Command>,
    watch: watch::Sender<Session>,
}

impl Room {
    /// bot-mode rooms carry their opponent; peer and local rooms do not
    pub fn spawn(session: Session, ledger: Arc<dyn Ledger>, robot: Option<Robot>) -> Handle {
        let (tx, rx) = unbounded_channel();
        let (state_tx, state_rx) = watch::channel(session.clone());
        let room = Room {
            session,
            ledger,
            robot,
            commands: rx,
            watch: state_tx,
        };
        tokio::spawn(room.run());
        Handle {
            commands: tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval(CLOCK_TICK);
        let mut poller = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        poller.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // intervals fire immediately; a free first tick is not a second
        self.drive_robot().await;
        self.publish();
        while !self.session.outcome.terminal() {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                _ = poller.tick() => self.on_poll().await,
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    // view torn down: both timers are cancelled with this task
                    None => return,
                },
            }
            self.drive_robot().await;
            self.publish();
        }
        self.conclude().await;
    }

    fn on_tick(&mut self) {
        self.session.tick();
        // our opponent's flag fell: claim it; ours is the opponent's to claim
        if self.session.ending == Some(Ending::Timeout)
            && self.session.outcome == crate::gameplay::Outcome::Winner(self.session.seat)
        {
            let ledger = Arc::clone(&self.ledger);
            let id = self.session.id;
            let seat = self.session.seat;
            tokio::spawn(async move {
                if let Err(e) = ledger.claim_timeout(id, seat).await {
                    log::warn!("timeout claim dropped: {}", e);
                }
            });
        }
    }

    /// awaited fetch, diffed into local state; a failure is skipped
    /// silently and retried on the next interval
    async fn on_poll(&mut self) {
        match self.ledger.session(self.session.id).await {
            Ok(remote) => self.session.merge(&remote),
            Err(e) => log::debug!("poll skipped: {}", e),
        }
    }

    async fn on_command(&mut self, command: Command) {
        match command {
            Command::Act(action) => self.on_act(action),
            Command::Pause => self.session.clock.pause(),
            Command::Resume => self.session.clock.resume(),
            Command::Resign => {
                self.session.resign();
                self.fire("resignation", |ledger, id, seat| async move {
                    ledger.resign(id, seat).await
                });
            }
            Command::OfferDraw => {
                self.session.draw_offer = Some(self.session.seat);
                self.fire("draw offer", |ledger, id, seat| async move {
                    ledger.offer_draw(id, seat).await
                });
            }
            Command::AcceptDraw => {
                if self.session.agree_draw() {
                    self.fire("draw acceptance", |ledger, id, seat| async move {
                        ledger.accept_draw(id, seat).await
                    });
                }
            }
        }
    }

    fn on_act(&mut self, action: Action) {
        // outside local mode the UI drives only its own seat
        if self.session.mode != Mode::Local
            && self.session.position.mover() != Some(self.session.seat)
        {
            log::warn!("action out of turn ignored: {}", action);
            return;
        }
        if let Some(record) = self.session.act(&action) {
            self.submit(record);
        }
    }

    /// best-effort remote submission; a failure is logged and surfaced as
    /// a notification, never a revert of the already-applied local state
    fn submit(&self, record: Record) {
        let ledger = Arc::clone(&self.ledger);
        let id = self.session.id;
        tokio::spawn(async move {
            if let Err(e) = ledger.submit(id, record).await {
                log::warn!("submission dropped ({}); the record will say otherwise", e);
            }
        });
    }

    /// in bot mode the opponent decides locally; its moves are never
    /// submitted and reach the record only through the stats mutation
    async fn drive_robot(&mut self) {
        let robot = match self.robot.as_ref() {
            Some(robot) => robot,
            None => return,
        };
        while !self.session.outcome.terminal()
            && self.session.position.mover() == Some(1 - self.session.seat)
        {
            let action = robot.decide(&self.session.position).await;
            self.session.act(&action);
            self.publish();
        }
    }

    async fn conclude(&mut self) {
        self.session.clock.pause();
        self.publish();
        log::info!(
            "session {} over: {} ({:?})",
            self.session.id,
            self.session.outcome,
            self.session.ending
        );
        records::report(self.ledger.as_ref(), self.session.game_record()).await;
    }

    fn publish(&self) {
        self.watch.send_replace(self.session.clone());
    }

    fn fire<F, Fut>(&self, label: &'static str, call: F)
    where
        F: FnOnce(Arc<dyn Ledger>, crate::ledger::SessionId, usize) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let fut = call(Arc::clone(&self.ledger), self.session.id, self.session.seat);
        tokio::spawn(async move {
            if let Err(e) = fut.await {
                log::warn!("{} dropped: {}", label, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::Kind;
    use crate::gameplay::Outcome;
    use crate::ledger::MemoryLedger;
    use crate::ledger::SessionRequest;
    use crate::oracle::Parrot;
    use std::time::Duration;

    async fn fresh(
        ledger: &Arc<MemoryLedger>,
        kind: Kind,
        mode: Mode,
    ) -> (Session, crate::ledger::SessionId) {
        let state = ledger
            .create_session(SessionRequest {
                kind,
                mode,
                creator: "alice".into(),
                opponent: Some("bob".into()),
            })
            .await
            .unwrap();
        (Session::join(&state, 0).unwrap(), state.id)
    }

    async fn settle(handle: &mut Handle, applied: usize) {
        tokio::time::timeout(Duration::from_secs(30), async {
            loop {
                if handle.state.borrow().applied >= applied {
                    return;
                }
                handle.state.changed().await.expect("room alive");
            }
        })
        .await
        .expect("room reached the expected log length");
    }

    /// wait for the fire-and-forget submissions to land on the authority
    async fn remote_settles(ledger: &Arc<MemoryLedger>, id: crate::ledger::SessionId, len: usize) {
        tokio::time::timeout(Duration::from_secs(30), async {
            loop {
                if ledger.session(id).await.unwrap().log.len() >= len {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("ledger reached the expected log length");
    }

    #[tokio::test(start_paused = true)]
    async fn bot_chess_round_trip() {
        // player moves e2e4, side to move flips, the muted oracle forces
        // a uniformly random legal reply, and the clock switches back
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, id) = fresh(&ledger, Kind::Chess, Mode::Bot).await;
        let mut handle = Room::spawn(
            session,
            Arc::clone(&ledger) as Arc<dyn Ledger>,
            Some(Robot::instant(Box::new(Parrot::mute()))),
        );
        handle.act(Action::parse(Kind::Chess, "e2e4").unwrap());
        settle(&mut handle, 2).await;
        let session = handle.session();
        assert_eq!(session.position.mover(), Some(0));
        assert_eq!(session.clock.active(), 0);
        assert_eq!(session.outcome, Outcome::InProgress);
        // only our submitted action reaches the ledger; the bot's stays local
        remote_settles(&ledger, id, 1).await;
        let remote = ledger.session(id).await.unwrap();
        assert_eq!(remote.log.len(), 1);
        assert_eq!(remote.log[0].seat, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_failure_does_not_revert() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, id) = fresh(&ledger, Kind::Chess, Mode::Peer).await;
        let mut handle = Room::spawn(session, Arc::clone(&ledger) as Arc<dyn Ledger>, None);
        ledger.sever();
        handle.act(Action::parse(Kind::Chess, "e2e4").unwrap());
        settle(&mut handle, 1).await;
        let session = handle.session();
        assert_eq!(session.applied, 1);
        assert_eq!(session.outcome, Outcome::InProgress);
        ledger.mend();
        assert_eq!(ledger.session(id).await.unwrap().log.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_replays_the_opponent() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, id) = fresh(&ledger, Kind::Chess, Mode::Peer).await;
        let mut handle = Room::spawn(session, Arc::clone(&ledger) as Arc<dyn Ledger>, None);
        handle.act(Action::parse(Kind::Chess, "e2e4").unwrap());
        settle(&mut handle, 1).await;
        remote_settles(&ledger, id, 1).await;
        // the peer acts through its own client straight onto the authority
        ledger
            .force_submit(
                id,
                Record {
                    seat: 1,
                    action: Action::parse(Kind::Chess, "e7e5").unwrap(),
                },
            )
            .await
            .unwrap();
        settle(&mut handle, 2).await;
        let session = handle.session();
        assert_eq!(session.applied, 2);
        assert_eq!(session.position.mover(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn remote_resignation_overrides_locally() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, id) = fresh(&ledger, Kind::Chess, Mode::Peer).await;
        let mut handle = Room::spawn(session, Arc::clone(&ledger) as Arc<dyn Ledger>, None);
        ledger.resign(id, 1).await.unwrap();
        let session = tokio::time::timeout(Duration::from_secs(30), handle.finished())
            .await
            .expect("session settles");
        assert_eq!(session.outcome, Outcome::Winner(0));
        assert_eq!(session.ending, Some(Ending::Remote));
        assert!(!session.clock.running());
    }

    #[tokio::test(start_paused = true)]
    async fn flag_fall_ends_the_session() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, _) = fresh(&ledger, Kind::Chess, Mode::Peer).await;
        let mut handle = Room::spawn(session, Arc::clone(&ledger) as Arc<dyn Ledger>, None);
        let session = tokio::time::timeout(Duration::from_secs(600), handle.finished())
            .await
            .expect("flag falls");
        assert_eq!(session.outcome, Outcome::Winner(1));
        assert_eq!(session.ending, Some(Ending::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn bot_session_reports_stats_at_the_end() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, _) = fresh(&ledger, Kind::Chess, Mode::Bot).await;
        let mut handle = Room::spawn(
            session,
            Arc::clone(&ledger) as Arc<dyn Ledger>,
            Some(Robot::instant(Box::new(Parrot::mute()))),
        );
        handle.send(Command::Resign);
        let session = tokio::time::timeout(Duration::from_secs(30), handle.finished())
            .await
            .expect("session settles");
        assert_eq!(session.ending, Some(Ending::Resignation));
        // drain the spawned report
        tokio::time::sleep(Duration::from_millis(50)).await;
        let recorded = ledger.recorded().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].won, Some(false));
        assert_eq!(recorded[0].player, "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn paused_clock_survives_modals() {
        let ledger = Arc::new(MemoryLedger::with_seed(1));
        let (session, _) = fresh(&ledger, Kind::Chess, Mode::Peer).await;
        let mut handle = Room::spawn(session, Arc::clone(&ledger) as Arc<dyn Ledger>, None);
        handle.send(Command::Pause);
        tokio::time::sleep(Duration::from_secs(20)).await;
        let before = handle.session().clock.remaining(0);
        assert_eq!(before, crate::CLOCK_START);
        handle.send(Command::Resume);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.session().clock.remaining(0) < crate::CLOCK_START);
    }
}
