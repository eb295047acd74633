pub mod blackjack;
pub mod cards;
pub mod chess;
pub mod clock;
pub mod gameplay;
pub mod gameroom;
pub mod holdem;
pub mod ledger;
pub mod lobby;
pub mod oracle;
pub mod players;
pub mod records;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Stack sizes, bets, and pot amounts.
pub type Chips = u64;
/// Opaque participant identifier handed out by the profile subsystem.
pub type Username = String;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent, bound = "")]
pub struct ID<T> {
    inner: uuid::Uuid,
    #[serde(skip)]
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(uuid::Uuid::parse_str(s)?))
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Starting stack for a heads-up hold'em session, in chips.
pub const STACK: Chips = 1000;
/// Big blind amount.
pub const B_BLIND: Chips = 20;
/// Small blind amount.
pub const S_BLIND: Chips = 10;
/// Seats at a blackjack table, the human always in seat 0.
pub const BJ_SEATS: usize = 3;
/// Decks in the blackjack shoe.
pub const BJ_DECKS: usize = 6;
/// Flat stake posted by every blackjack seat.
pub const BJ_STAKE: Chips = 50;
/// Bankroll each blackjack seat starts with (covers doubling).
pub const BJ_BANKROLL: Chips = 500;
/// Dealer stands at or above this hand value, soft hands included only above it.
pub const BJ_STAND: u32 = 17;

// ============================================================================
// TIMING PARAMETERS
// All latency bounds are formal parameters so tests can simulate worst-case
// staleness deterministically.
// ============================================================================
/// Time each player starts with on the clock.
pub const CLOCK_START: std::time::Duration = std::time::Duration::from_secs(300);
/// Time credited back to the mover on every applied action.
pub const CLOCK_INCREMENT: std::time::Duration = std::time::Duration::from_secs(10);
/// Cooperative clock resolution.
pub const CLOCK_TICK: std::time::Duration = std::time::Duration::from_secs(1);
/// Interval between reconciliation fetches of the remote action log.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3);
/// Interval between lobby-resolution fetches.
pub const LOBBY_POLL: std::time::Duration = std::time::Duration::from_secs(2);
/// Lobby fetches before resolution gives up and surfaces an error.
pub const LOBBY_ATTEMPTS: usize = 90;
/// Artificial delay pacing robot decisions so the UI can animate thinking.
pub const THINK_DELAY: std::time::Duration = std::time::Duration::from_millis(600);
/// Deadline for one oracle suggestion round-trip.
pub const ORACLE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        println!();
        log::warn!("interrupt received, exiting immediately");
        std::process::exit(0);
    });
}
