use crate::CLOCK_START;
use crate::Username;
use crate::clock::Clock;
use crate::gameplay::Action;
use crate::gameplay::Kind;
use crate::gameplay::Mode;
use crate::gameplay::Outcome;
use crate::gameplay::Position;
use crate::gameplay::Record;
use crate::ledger::SessionId;
use crate::ledger::SessionState;
use crate::ledger::SessionStatus;
use crate::records::GameRecord;

/// How a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// checkmate, stalemate, fold, showdown, bust: decided by the rules
    Rules,
    /// a flag fell
    Timeout,
    /// we resigned locally
    Resignation,
    /// a draw offer was accepted locally
    DrawAgreement,
    /// the remote record settled it first: resignation, expiry, or a
    /// result this client had not derived yet
    Remote,
}

/// Local, immediately-responsive view of one session.
///
/// This is the single writer over its Position. Optimistic local actions,
/// replayed remote suffixes, and clock ticks all funnel through these
/// methods, and the surrounding Room serializes them onto one task. The
/// invariant: `applied` counts exactly the actions reflected in
/// `position`, so replaying a remote log suffix beyond that count is
/// idempotent by construction.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub kind: Kind,
    pub mode: Mode,
    pub players: Vec<Username>,
    /// our chair: 0 for the creator, 1 for the joiner
    pub seat: usize,
    pub seed: u64,
    pub position: Position,
    /// actions reflected in position; never exceeds the remote log except
    /// inside the optimistic window
    pub applied: usize,
    pub clock: Clock,
    pub outcome: Outcome,
    pub ending: Option<Ending>,
    pub draw_offer: Option<usize>,
}

impl Session {
    /// derive the local session from a remote snapshot, replaying its log
    /// over the seeded initial position
    pub fn join(state: &SessionState, seat: usize) -> anyhow::Result<Self> {
        let position = Position::replay(state.kind, state.seed, &state.log)?;
        let outcome = position.outcome();
        let mut clock = Clock::new(CLOCK_START);
        match position.mover() {
            Some(mover) => clock.set_active(mover),
            None => clock.pause(),
        }
        let mut session = Self {
            id: state.id,
            kind: state.kind,
            mode: state.mode,
            players: state.players.clone(),
            seat,
            seed: state.seed,
            position,
            applied: state.log.len(),
            clock,
            outcome,
            ending: outcome.terminal().then_some(Ending::Rules),
            draw_offer: state.draw_offer,
        };
        if state.status.terminal() {
            session.overridden(state);
        }
        Ok(session)
    }

    /// Optimistic apply: validate through the rule engine, replace the
    /// Position, stamp the clock. Returns the Record for the caller to
    /// submit; an illegal action is a logged no-op with nothing mutated.
    pub fn act(&mut self, action: &Action) -> Option<Record> {
        if self.outcome.terminal() {
            return None;
        }
        let mover = self.position.mover()?;
        if !self.position.is_allowed(action) {
            log::warn!("illegal action ignored: {}", action);
            return None;
        }
        match (&self.position, action) {
            (Position::Chess(board), Action::Chess(m)) => {
                log::info!("seat {} plays {}", mover, board.notation(m))
            }
            _ => log::info!("seat {} plays {}", mover, action),
        }
        let next = self
            .position
            .apply(action)
            .expect("allowed action applies");
        self.advance(mover, next);
        Some(Record {
            seat: mover,
            action: *action,
        })
    }

    /// Merge a remote snapshot. A terminal remote status wins over any
    /// local not-yet-terminal read; otherwise peer sessions replay the
    /// unseen suffix of the action log. Merging the same snapshot twice
    /// is a no-op.
    pub fn merge(&mut self, remote: &SessionState) {
        self.draw_offer = remote.draw_offer;
        if remote.status.terminal() {
            self.overridden(remote);
            return;
        }
        if self.mode == Mode::Peer {
            self.replay(&remote.log);
        }
    }

    /// Clock tick. The flag is checked before any terminal-by-rule read:
    /// a timeout on the same tick as a mate records as a timeout.
    pub fn tick(&mut self) {
        if self.outcome.terminal() {
            return;
        }
        if self.clock.tick() {
            let loser = self.clock.active();
            self.outcome = Outcome::Winner(1 - loser);
            self.ending = Some(Ending::Timeout);
            self.clock.pause();
        }
    }

    pub fn resign(&mut self) {
        if self.outcome.terminal() {
            return;
        }
        self.outcome = Outcome::Winner(1 - self.seat);
        self.ending = Some(Ending::Resignation);
        self.clock.pause();
    }

    /// accepting is only meaningful against the opponent's standing offer
    pub fn agree_draw(&mut self) -> bool {
        match self.draw_offer {
            Some(offerer) if offerer != self.seat && !self.outcome.terminal() => {
                self.outcome = Outcome::Draw;
                self.ending = Some(Ending::DrawAgreement);
                self.clock.pause();
                true
            }
            _ => false,
        }
    }

    /// what the stats mutation reports at game end
    pub fn game_record(&self) -> GameRecord {
        GameRecord {
            kind: self.kind,
            player: self.players.get(self.seat).cloned().unwrap_or_default(),
            won: match self.outcome {
                Outcome::Winner(winner) => Some(winner == self.seat),
                Outcome::Draw => None,
                Outcome::InProgress => None,
            },
            moves: self.applied as u32,
        }
    }
}

impl Session {
    fn advance(&mut self, mover: usize, next: Position) {
        self.position = next;
        self.applied += 1;
        match self.position.mover() {
            Some(next_mover) => self.clock.press(mover, next_mover),
            None => self.clock.pause(),
        }
        self.outcome = self.position.outcome();
        if self.outcome.terminal() {
            self.ending = Some(Ending::Rules);
            self.clock.pause();
        }
    }

    /// replay only the delta beyond what is already applied locally
    fn replay(&mut self, log: &[Record]) {
        if log.len() <= self.applied {
            return;
        }
        for record in log[self.applied..].iter() {
            let mover = match self.position.mover() {
                Some(mover) => mover,
                None => break,
            };
            match self.position.apply(&record.action) {
                Ok(next) => self.advance(mover, next),
                Err(e) => {
                    // the authority re-serialized past our optimistic apply;
                    // re-derive truth from scratch rather than guess
                    log::warn!("remote log diverged at {} ({}), rebuilding", self.applied, e);
                    self.rebuild(log);
                    break;
                }
            }
        }
    }

    fn rebuild(&mut self, log: &[Record]) {
        match Position::replay(self.kind, self.seed, log) {
            Ok(position) => {
                self.position = position;
                self.applied = log.len();
                match self.position.mover() {
                    Some(mover) => self.clock.set_active(mover),
                    None => self.clock.pause(),
                }
                self.outcome = self.position.outcome();
                if self.outcome.terminal() {
                    self.ending = Some(Ending::Rules);
                    self.clock.pause();
                }
            }
            Err(e) => log::error!("remote log does not replay: {}", e),
        }
    }

    fn overridden(&mut self, remote: &SessionState) {
        self.outcome = match remote.winner {
            Some(winner) => Outcome::Winner(winner),
            None => Outcome::Draw,
        };
        self.ending = Some(match remote.status {
            SessionStatus::TimedOut => Ending::Timeout,
            _ => Ending::Remote,
        });
        self.clock.pause();
    }
}
