//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Player actions arrive over an mpsc channel and clock ticks come from
//! the room's own [`TickScheduler`]; both are handled in one `select!`
//! loop, so every change to a room happens in a single total order.
//! After each committed change the actor checks the room's invariants,
//! publishes the new view to subscribers, and only then replies.

use std::time::Duration;

use neologisms_protocol::{GameView, RoomId, SessionId, Square, Update, Username};
use neologisms_tick::{TickConfig, TickInfo, TickScheduler};
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::hub::{BroadcastHub, UpdateSender};
use crate::rules::{self, TickOutcome};
use crate::{Room, RoomConfig, RoomError};

/// A closure run against the room inside the actor. It returns the
/// delivery of its result, which the actor calls only after the room has
/// been checked and committed.
pub(crate) type RoomJob = Box<dyn FnOnce(&mut Room) -> JobReply + Send>;

/// Sends a job's result to its caller.
pub(crate) type JobReply = Box<dyn FnOnce() + Send>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel.
pub(crate) enum RoomCommand {
    Draw {
        player: Username,
        reply: oneshot::Sender<Result<GameView, RoomError>>,
    },
    GiveClue {
        player: Username,
        text: String,
        reply: oneshot::Sender<Result<GameView, RoomError>>,
    },
    Guess {
        player: Username,
        square: Square,
        reply: oneshot::Sender<Result<(GameView, bool), RoomError>>,
    },
    Refresh {
        reply: oneshot::Sender<GameView>,
    },
    Snapshot {
        reply: oneshot::Sender<GameView>,
    },
    Subscribe {
        session: SessionId,
        sender: UpdateSender,
        reply: oneshot::Sender<()>,
    },
    Unsubscribe {
        session: SessionId,
        reply: oneshot::Sender<bool>,
    },
    SubscriberCount {
        reply: oneshot::Sender<usize>,
    },
    /// Arbitrary access; the job hands back its own reply.
    Run { job: RoomJob },
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. The registry
/// holds one per room and hands out clones.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's ID.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Draws a card for `player`.
    pub async fn draw(&self, player: Username) -> Result<GameView, RoomError> {
        self.request(|reply| RoomCommand::Draw { player, reply })
            .await?
    }

    /// Gives a clue for `player`'s card.
    pub async fn give_clue(
        &self,
        player: Username,
        text: impl Into<String>,
    ) -> Result<GameView, RoomError> {
        let text = text.into();
        self.request(|reply| RoomCommand::GiveClue {
            player,
            text,
            reply,
        })
        .await?
    }

    /// Guesses the active clue. Returns the view and whether it was right.
    pub async fn guess(
        &self,
        player: Username,
        square: Square,
    ) -> Result<(GameView, bool), RoomError> {
        self.request(|reply| RoomCommand::Guess {
            player,
            square,
            reply,
        })
        .await?
    }

    /// Deals a new board in this room.
    pub async fn refresh(&self) -> Result<GameView, RoomError> {
        self.request(|reply| RoomCommand::Refresh { reply }).await
    }

    /// The current view, without changing anything.
    pub async fn snapshot(&self) -> Result<GameView, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Subscribes a session. It receives the current view right away and
    /// every committed change after that.
    pub async fn subscribe(
        &self,
        session: SessionId,
        sender: UpdateSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Subscribe {
            session,
            sender,
            reply,
        })
        .await
    }

    /// Unsubscribes a session. Returns `false` if it was not subscribed.
    pub async fn unsubscribe(&self, session: SessionId) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::Unsubscribe { session, reply })
            .await
    }

    /// Number of sessions currently subscribed.
    pub async fn subscriber_count(&self) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::SubscriberCount { reply })
            .await
    }

    /// Runs `f` against the room with exclusive access.
    ///
    /// If `f` changes the room, subscribers get an update just as they
    /// would after a player action. The result is only returned once the
    /// changed room has passed its invariant checks; a closure that breaks
    /// them takes the room down and gets [`RoomError::Unavailable`].
    pub async fn with_room<T, F>(&self, f: F) -> Result<T, RoomError>
    where
        F: FnOnce(&mut Room) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.request(|reply| RoomCommand::Run {
            job: Box::new(move |room: &mut Room| -> JobReply {
                let result = f(room);
                Box::new(move || {
                    let _ = reply.send(result);
                })
            }),
        })
        .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    hub: BroadcastHub,
    clock: TickScheduler,
    /// Clock time not yet counted down (less than one second).
    carry: Duration,
    rng: StdRng,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                info = self.clock.wait_for_tick() => self.on_tick(info),
            }
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Draw { player, reply } => {
                let result = match rules::draw(&mut self.room, &player) {
                    Ok(outcome) => {
                        if outcome.started_clock {
                            self.start_clock();
                        }
                        tracing::debug!(room_id = %self.room.id(), %player, "card drawn");
                        Ok(self.commit(None))
                    }
                    Err(e) => Err(self.rejected("draw", &player, e.into())),
                };
                let _ = reply.send(result);
            }
            RoomCommand::GiveClue {
                player,
                text,
                reply,
            } => {
                let result = match rules::give_clue(&mut self.room, &player, &text) {
                    Ok(()) => {
                        tracing::debug!(room_id = %self.room.id(), %player, "clue given");
                        Ok(self.commit(None))
                    }
                    Err(e) => Err(self.rejected("give_clue", &player, e.into())),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Guess {
                player,
                square,
                reply,
            } => {
                let result = match rules::guess(&mut self.room, &player, square) {
                    Ok(correct) => {
                        tracing::debug!(
                            room_id = %self.room.id(),
                            %player,
                            %square,
                            correct,
                            "guess"
                        );
                        if self.room.is_finished() {
                            tracing::info!(
                                room_id = %self.room.id(),
                                final_score = ?self.room.final_score(),
                                "board cleared, game finished"
                            );
                        }
                        Ok((self.commit(Some(correct)), correct))
                    }
                    Err(e) => Err(self.rejected("guess", &player, e.into())),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Refresh { reply } => {
                rules::refresh(&mut self.room, &mut self.rng);
                tracing::info!(room_id = %self.room.id(), "room refreshed");
                let _ = reply.send(self.commit(None));
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.view());
            }
            RoomCommand::Subscribe {
                session,
                sender,
                reply,
            } => {
                let current = Update {
                    game: self.room.view(),
                    correct: None,
                };
                self.hub.subscribe(session, sender, current);
                tracing::debug!(
                    room_id = %self.room.id(),
                    %session,
                    subscribers = self.hub.len(),
                    "session subscribed"
                );
                let _ = reply.send(());
            }
            RoomCommand::Unsubscribe { session, reply } => {
                let removed = self.hub.unsubscribe(session);
                tracing::debug!(
                    room_id = %self.room.id(),
                    %session,
                    removed,
                    "session unsubscribed"
                );
                let _ = reply.send(removed);
            }
            RoomCommand::SubscriberCount { reply } => {
                let _ = reply.send(self.hub.len());
            }
            RoomCommand::Run { job } => {
                let before = self.room.clone();
                let deliver = job(&mut self.room);
                if self.room != before {
                    if self.room.clock_running() && !self.clock.is_running() {
                        self.start_clock();
                    }
                    self.commit(None);
                }
                deliver();
            }
        }
    }

    fn on_tick(&mut self, info: TickInfo) {
        let ticks = u32::try_from(info.elapsed_ticks()).unwrap_or(u32::MAX);
        self.carry = self.carry.saturating_add(info.dt.saturating_mul(ticks));
        let secs = self.carry.as_secs();
        if secs == 0 {
            return;
        }
        self.carry -= Duration::from_secs(secs);

        let outcome = rules::tick(&mut self.room, u32::try_from(secs).unwrap_or(u32::MAX));
        match outcome {
            TickOutcome::Idle => self.clock.stop(),
            TickOutcome::Counted { remaining } => {
                tracing::trace!(room_id = %self.room.id(), remaining, "clock");
            }
            TickOutcome::Finished { final_score } => {
                tracing::info!(room_id = %self.room.id(), final_score, "time is up, game finished");
            }
        }
        if outcome.changed() {
            self.commit(None);
        }
    }

    fn start_clock(&mut self) {
        self.carry = Duration::ZERO;
        self.clock.start();
    }

    /// Checks the room, syncs the clock and publishes the new view.
    ///
    /// # Panics
    ///
    /// If a room invariant is broken. That is a bug in the rules engine,
    /// and continuing would broadcast a corrupt board.
    fn commit(&mut self, correct: Option<bool>) -> GameView {
        let violations = self.room.check_invariants();
        if !violations.is_empty() {
            tracing::error!(room_id = %self.room.id(), ?violations, "room invariants broken");
        }
        assert!(
            violations.is_empty(),
            "room {} violated its invariants: {violations:?}",
            self.room.id()
        );

        if !self.room.clock_running() {
            self.clock.stop();
        }

        let game = self.room.view();
        self.hub.publish(&Update {
            game: game.clone(),
            correct,
        });
        game
    }

    fn rejected(&self, action: &str, player: &Username, err: RoomError) -> RoomError {
        tracing::debug!(
            room_id = %self.room.id(),
            %player,
            action,
            error = %err,
            "action rejected"
        );
        err
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// `rng` deals every later refresh of this room.
pub(crate) fn spawn_room(room: Room, config: &RoomConfig, rng: StdRng) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_channel_size.max(1));
    let room_id = room.id().clone();

    let actor = RoomActor {
        room,
        hub: BroadcastHub::new(),
        clock: TickScheduler::new(TickConfig::with_rate(config.tick_rate_hz)),
        carry: Duration::ZERO,
        rng,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
