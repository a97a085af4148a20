use std::time::Duration;

use fl_simulation::{DogId, JoinOutcome, SessionState, TickReport};
use fl_store::PlayerRecord;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::application::{Application, MapInfo};
use crate::error::{AppError, AppResult};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<AppResult<T>>;

#[derive(Debug)]
enum Command {
    Join {
        map: String,
        name: String,
        reply: Reply<JoinOutcome>,
    },
    SetDirection {
        dog: DogId,
        code: String,
        reply: Reply<()>,
    },
    Tick {
        delta: Duration,
        reply: Reply<TickReport>,
    },
    State {
        session: String,
        reply: Reply<SessionState>,
    },
    Maps {
        reply: Reply<Vec<MapInfo>>,
    },
    Records {
        offset: usize,
        limit: usize,
        reply: Reply<Vec<PlayerRecord>>,
    },
    Save {
        reply: Reply<bool>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// The single task that owns the [`Application`].
///
/// Commands are applied in the order they arrive, interleaved with clock
/// ticks; nothing else touches the game state.
#[derive(Debug)]
pub struct Strand;

impl Strand {
    /// Start the strand. With a `tick_period` the world advances on its own
    /// by the real time elapsed between ticks; without one it waits for
    /// [`StrandHandle::tick`]. A zero period counts as no period. The join
    /// handle yields the application back once the strand stops.
    pub fn spawn(
        app: Application,
        tick_period: Option<Duration>,
    ) -> (StrandHandle, JoinHandle<Application>) {
        let tick_period = tick_period.filter(|period| {
            if period.is_zero() {
                tracing::warn!("zero tick period ignored, ticks are manual");
            }
            !period.is_zero()
        });
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = tokio::spawn(run(app, rx, tick_period));
        (StrandHandle { tx }, handle)
    }
}

async fn run(
    mut app: Application,
    mut rx: mpsc::Receiver<Command>,
    tick_period: Option<Duration>,
) -> Application {
    let mut ticker = tick_period.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut last_tick = Instant::now();
    tracing::info!(?tick_period, "strand started");

    loop {
        tokio::select! {
            biased;

            command = rx.recv() => match command {
                Some(Command::Shutdown { reply }) => {
                    let _ = reply.send(app.save().map(|_| ()));
                    break;
                }
                Some(command) => handle(&mut app, command, tick_period.is_some()),
                None => {
                    if let Err(e) = app.save() {
                        tracing::error!(error = %e, "final save failed");
                    }
                    break;
                }
            },
            now = next_tick(&mut ticker) => {
                let delta = now.saturating_duration_since(last_tick);
                last_tick = now;
                if let Err(e) = app.tick(delta) {
                    tracing::error!(error = %e, "tick failed");
                }
            }
        }
    }

    tracing::info!(tick = app.registry().clock().tick(), "strand stopped");
    app
}

async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

fn handle(app: &mut Application, command: Command, clock_driven: bool) {
    match command {
        Command::Join { map, name, reply } => {
            let _ = reply.send(app.join(&map, &name));
        }
        Command::SetDirection { dog, code, reply } => {
            let _ = reply.send(app.set_direction(dog, &code));
        }
        Command::Tick { delta, reply } => {
            let result = if clock_driven {
                Err(AppError::ManualTickDisabled)
            } else {
                app.tick(delta)
            };
            let _ = reply.send(result);
        }
        Command::State { session, reply } => {
            let _ = reply.send(app.state(&session));
        }
        Command::Maps { reply } => {
            let _ = reply.send(Ok(app.maps()));
        }
        Command::Records {
            offset,
            limit,
            reply,
        } => {
            let _ = reply.send(app.records(offset, limit));
        }
        Command::Save { reply } => {
            let _ = reply.send(app.save());
        }
        Command::Shutdown { reply } => {
            let _ = reply.send(Ok(()));
        }
    }
}

/// A cloneable way to talk to the strand.
#[derive(Debug, Clone)]
pub struct StrandHandle {
    tx: mpsc::Sender<Command>,
}

impl StrandHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> AppResult<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| AppError::StrandClosed)?;
        response.await.map_err(|_| AppError::StrandClosed)?
    }

    /// Add a player to the session on `map`.
    pub async fn join(&self, map: impl Into<String>, name: impl Into<String>) -> AppResult<JoinOutcome> {
        let (map, name) = (map.into(), name.into());
        self.request(|reply| Command::Join { map, name, reply }).await
    }

    /// Steer a dog with a client direction code.
    pub async fn set_direction(&self, dog: DogId, code: impl Into<String>) -> AppResult<()> {
        let code = code.into();
        self.request(|reply| Command::SetDirection { dog, code, reply })
            .await
    }

    /// Advance the world by `delta`. Only allowed without a tick period.
    pub async fn tick(&self, delta: Duration) -> AppResult<TickReport> {
        self.request(|reply| Command::Tick { delta, reply }).await
    }

    /// The client view of a session.
    pub async fn state(&self, session: impl Into<String>) -> AppResult<SessionState> {
        let session = session.into();
        self.request(|reply| Command::State { session, reply }).await
    }

    /// Every loaded map, in configuration order.
    pub async fn maps(&self) -> AppResult<Vec<MapInfo>> {
        self.request(|reply| Command::Maps { reply }).await
    }

    /// A page of the leaderboard.
    pub async fn records(&self, offset: usize, limit: usize) -> AppResult<Vec<PlayerRecord>> {
        self.request(|reply| Command::Records {
            offset,
            limit,
            reply,
        })
        .await
    }

    /// Save the world now. Returns whether a state file is configured.
    pub async fn save(&self) -> AppResult<bool> {
        self.request(|reply| Command::Save { reply }).await
    }

    /// Stop the strand after a final save.
    pub async fn shutdown(&self) -> AppResult<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
