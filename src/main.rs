//! parlor terminal client
//!
//! Runs one session of chess, heads-up hold'em, or blackjack against a
//! robot, a lobby peer, or a second local player, keeping the local state
//! reconciled with the remote ledger record.

use clap::Parser;
use parlor::gameplay::Kind;
use parlor::gameplay::Mode;
use parlor::gameroom::Command;
use parlor::gameroom::Handle;
use parlor::gameroom::Room;
use parlor::gameroom::Session;
use parlor::ledger::HttpLedger;
use parlor::ledger::Ledger;
use parlor::ledger::LobbyId;
use parlor::ledger::MemoryLedger;
use parlor::ledger::Profile;
use parlor::ledger::SessionRequest;
use parlor::ledger::SessionState;
use parlor::lobby::Bridge;
use parlor::oracle::Oracle;
use parlor::oracle::Parrot;
use parlor::oracle::Suggest;
use parlor::players::Choice;
use parlor::players::Human;
use parlor::players::Robot;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "parlor", about = "table games against a remote ledger")]
struct Args {
    /// game to play
    #[arg(long, value_enum, default_value_t = Kind::Chess)]
    game: Kind,
    /// opponent type
    #[arg(long, value_enum, default_value_t = Mode::Bot)]
    mode: Mode,
    /// hosted ledger base url; omit to play against the in-process ledger
    #[arg(long)]
    ledger: Option<String>,
    /// suggestion service url for the robot; omit for pure fallback play
    #[arg(long)]
    oracle: Option<String>,
    /// display name reported with game records
    #[arg(long, default_value = "anon")]
    name: String,
    /// wallet address forwarded to the profile subsystem, if any
    #[arg(long, default_value = "")]
    address: String,
    /// join this shared lobby id instead of creating a session
    #[arg(long)]
    lobby: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parlor::log();
    parlor::kys();
    let args = Args::parse();
    let ledger: Arc<dyn Ledger> = match args.ledger.as_deref() {
        Some(url) => Arc::new(HttpLedger::new(url)?),
        None => Arc::new(MemoryLedger::default()),
    };
    // registration is best-effort; play proceeds whether or not it lands
    let profile = Profile {
        username: args.name.clone(),
        address: args.address.clone(),
    };
    if let Err(e) = ledger.register(profile).await {
        log::warn!("registration dropped: {}", e);
    }
    let (state, seat) = seat_at_table(&args, ledger.as_ref()).await?;
    let robot = match state.mode {
        Mode::Bot => Some(Robot::new(match args.oracle.as_deref() {
            Some(url) => Box::new(Oracle::new(url)?) as Box<dyn Suggest>,
            None => Box::new(Parrot::mute()),
        })),
        _ => None,
    };
    let session = Session::join(&state, seat)?;
    log::info!("session {} as seat {} ({})", session.id, seat, session.kind);
    let mut handle = Room::spawn(session, Arc::clone(&ledger), robot);
    let session = drive(&mut handle, seat).await?;
    println!("{}", session.position.describe());
    println!("{}", session.outcome);
    Ok(())
}

/// create a session directly, or resolve a shared lobby into one
async fn seat_at_table(args: &Args, ledger: &dyn Ledger) -> anyhow::Result<(SessionState, usize)> {
    match args.lobby.as_deref() {
        Some(lobby) => {
            let id = lobby.parse::<LobbyId>()?;
            ledger.join_lobby(id, args.name.clone(), None).await?;
            let session = Bridge::resolve(ledger, id).await?;
            Ok((ledger.session(session).await?, 1))
        }
        None => {
            let state = ledger
                .create_session(SessionRequest {
                    kind: args.game,
                    mode: args.mode,
                    creator: args.name.clone(),
                    opponent: None,
                })
                .await?;
            Ok((state, 0))
        }
    }
}

/// terminal loop: prompt on our turn, watch the room otherwise
async fn drive(handle: &mut Handle, seat: usize) -> anyhow::Result<Session> {
    loop {
        let session = handle.session();
        if session.outcome.terminal() {
            return Ok(handle.finished().await);
        }
        let ours = session.mode == Mode::Local || session.position.mover() == Some(seat);
        if !ours {
            if handle.state.changed().await.is_err() {
                return Ok(handle.session());
            }
            continue;
        }
        println!("{}", session.position.describe());
        let position = session.position.clone();
        let choice = tokio::task::spawn_blocking(move || Human::decide(&position)).await??;
        match choice {
            Choice::Play(action) => {
                let applied = session.applied;
                handle.act(action);
                // wait for the room to reflect the action before prompting again
                while handle.session().applied == applied && !handle.session().outcome.terminal() {
                    if handle.state.changed().await.is_err() {
                        return Ok(handle.session());
                    }
                }
            }
            Choice::Resign => handle.send(Command::Resign),
            Choice::OfferDraw => handle.send(Command::OfferDraw),
            Choice::AcceptDraw => handle.send(Command::AcceptDraw),
        }
        if handle.state.changed().await.is_err() {
            return Ok(handle.session());
        }
    }
}
