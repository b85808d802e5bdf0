//! The game server actor.
//!
//! [`GameServer`] is the single writer of a game. Requests reach it over an
//! mpsc channel and are handled one at a time, in arrival order, so no two
//! mutations ever overlap. [`ServerHandle`] is the cloneable front end.

use std::collections::BTreeMap;

use col_core::features::Trait;
use col_core::game::Game;
use col_core::objects::ObjectId;
use col_core::protocol::{FeatureChangeMessage, FeatureChangeOutcome, Message};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::ai::AiController;
use crate::queue::OutboundQueue;
use crate::{ServerConfig, ServerError};

/// Capacity of the request channel.
const REQUEST_BUFFER: usize = 64;

/// What ending a turn did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSummary {
    /// The turn that has just started.
    pub turn: u32,
    /// Idle missions handed out before the AI ran.
    pub assigned: usize,
    /// Missions stepped.
    pub missions_run: usize,
    /// Missions that completed.
    pub missions_completed: usize,
    /// Feature changes queued for clients.
    pub changes_queued: usize,
}

/// A request to the server task.
#[derive(Debug)]
pub enum ServerRequest {
    /// Decode and apply one inbound wire line.
    ApplyWire {
        /// The JSON line.
        line: String,
        /// Outcome of a feature change, `None` if the message was ignored.
        reply: oneshot::Sender<Result<Option<FeatureChangeOutcome>, ServerError>>,
    },
    /// Apply an already decoded message.
    Apply {
        /// The message.
        message: Message,
        /// Outcome of a feature change, `None` if the message was ignored.
        reply: oneshot::Sender<Option<FeatureChangeOutcome>>,
    },
    /// Run the AI and advance the turn.
    EndTurn {
        /// Summary of the turn.
        reply: oneshot::Sender<Result<TurnSummary, ServerError>>,
    },
    /// Copy of the current game state.
    Snapshot {
        /// The copy.
        reply: oneshot::Sender<Game>,
    },
    /// Take every queued outbound message.
    DrainOutbound {
        /// Messages in delivery order.
        reply: oneshot::Sender<Vec<Message>>,
    },
    /// Stop the task.
    Shutdown,
}

/// Authoritative owner of one game.
#[derive(Debug)]
pub struct GameServer {
    game: Game,
    ai: AiController,
    outbound: OutboundQueue,
    rng: ChaCha8Rng,
    history_sent: BTreeMap<ObjectId, usize>,
}

impl GameServer {
    /// Wrap a game. AI randomness is seeded from the config.
    #[must_use]
    pub fn new(game: Game, config: &ServerConfig) -> Self {
        let history_sent = game
            .objects()
            .iter()
            .filter(|o| o.player.is_some())
            .map(|o| (o.id, o.features.history().len()))
            .collect();
        Self {
            game,
            ai: AiController::new(),
            outbound: OutboundQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(config.ai_seed),
            history_sent,
        }
    }

    /// The game.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// The AI controller.
    #[must_use]
    pub const fn ai(&self) -> &AiController {
        &self.ai
    }

    /// The AI controller, for handing out missions.
    pub fn ai_mut(&mut self) -> &mut AiController {
        &mut self.ai
    }

    /// Messages waiting for delivery.
    #[must_use]
    pub const fn outbound(&self) -> &OutboundQueue {
        &self.outbound
    }

    /// Take every queued outbound message in delivery order.
    pub fn drain_outbound(&mut self) -> Vec<Message> {
        self.outbound.drain()
    }

    /// Apply an inbound message.
    ///
    /// Feature changes that touched a live object are echoed to the
    /// outbound queue. Turn changes are server-driven, so an inbound one is
    /// ignored.
    pub fn apply(&mut self, message: Message) -> Option<FeatureChangeOutcome> {
        match message {
            Message::FeatureChange(change) => {
                let outcome = change.apply(self.game.objects_mut());
                if matches!(outcome, FeatureChangeOutcome::Applied { .. }) {
                    // The echo already carries any history the client changed.
                    if let Some(target) = self.game.objects().get(change.id) {
                        if target.player.is_some() {
                            self.history_sent
                                .insert(change.id, target.features.history().len());
                        }
                    }
                    self.outbound.push(Message::FeatureChange(change));
                }
                Some(outcome)
            }
            Message::NewTurn { turn } => {
                tracing::warn!(turn, "Ignoring client turn change");
                None
            }
        }
    }

    /// Decode one wire line and apply it.
    pub fn apply_wire(&mut self, line: &str) -> Result<Option<FeatureChangeOutcome>, ServerError> {
        let message = Message::from_wire(line).map_err(|e| {
            tracing::warn!(error = %e, "Rejected inbound record");
            e
        })?;
        Ok(self.apply(message))
    }

    /// Run every AI mission, publish new history and start the next turn.
    pub fn end_turn(&mut self) -> Result<TurnSummary, ServerError> {
        let assigned = self.ai.assign_idle_missions(&self.game);
        let report = self.ai.run_turn(&mut self.game, &mut self.rng)?;
        let changes_queued = self.queue_history_changes();

        let turn = self.game.new_turn();
        self.outbound.push(Message::NewTurn { turn });

        let summary = TurnSummary {
            turn,
            assigned,
            missions_run: report.ran,
            missions_completed: report.completed,
            changes_queued,
        };
        tracing::info!(
            turn,
            assigned,
            missions = report.ran,
            completed = report.completed,
            changes = changes_queued,
            "Turn ended"
        );
        Ok(summary)
    }

    /// Queue a feature change for every player whose history grew.
    fn queue_history_changes(&mut self) -> usize {
        let mut queued = 0;
        for object in self.game.objects().iter().filter(|o| o.player.is_some()) {
            let history = object.features.history();
            let sent = self.history_sent.entry(object.id).or_insert(0);
            if history.len() < *sent {
                *sent = history.len();
            }
            if history.len() == *sent {
                continue;
            }
            let events = history[*sent..]
                .iter()
                .cloned()
                .map(Trait::HistoryEvent)
                .collect();
            *sent = history.len();
            self.outbound.push(Message::FeatureChange(
                FeatureChangeMessage::with_children(object.id, events, true),
            ));
            queued += 1;
        }
        queued
    }

    /// Handle one request. Returns `false` once the server should stop.
    pub fn handle(&mut self, request: ServerRequest) -> bool {
        match request {
            ServerRequest::ApplyWire { line, reply } => {
                let _ = reply.send(self.apply_wire(&line));
            }
            ServerRequest::Apply { message, reply } => {
                let _ = reply.send(self.apply(message));
            }
            ServerRequest::EndTurn { reply } => {
                let result = self.end_turn();
                if let Err(e) = &result {
                    tracing::error!(error = %e, "Turn failed");
                }
                let _ = reply.send(result);
            }
            ServerRequest::Snapshot { reply } => {
                let _ = reply.send(self.game.clone());
            }
            ServerRequest::DrainOutbound { reply } => {
                let _ = reply.send(self.drain_outbound());
            }
            ServerRequest::Shutdown => return false,
        }
        true
    }

    async fn run(mut self, mut requests: mpsc::Receiver<ServerRequest>) {
        tracing::info!(turn = self.game.turn(), "Server task started");
        while let Some(request) = requests.recv().await {
            if !self.handle(request) {
                break;
            }
        }
        tracing::info!(
            turn = self.game.turn(),
            pending = self.outbound.len(),
            "Server task stopped"
        );
    }

    /// Move the server onto a tokio task.
    #[must_use]
    pub fn spawn(self) -> ServerHandle {
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        let task = tokio::spawn(self.run(rx));
        ServerHandle {
            requests: tx,
            task: Some(task),
        }
    }
}

/// Spawn a server task for `game`.
#[must_use]
pub fn spawn(game: Game, config: &ServerConfig) -> ServerHandle {
    GameServer::new(game, config).spawn()
}

/// Front end to a running [`GameServer`] task.
#[derive(Debug)]
pub struct ServerHandle {
    requests: mpsc::Sender<ServerRequest>,
    task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ServerRequest,
    ) -> Result<T, ServerError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(make(tx))
            .await
            .map_err(|_| ServerError::Closed)?;
        rx.await.map_err(|_| ServerError::Closed)
    }

    /// Send one inbound wire line.
    pub async fn apply_wire(
        &self,
        line: impl Into<String>,
    ) -> Result<Option<FeatureChangeOutcome>, ServerError> {
        let line = line.into();
        self.request(|reply| ServerRequest::ApplyWire { line, reply })
            .await?
    }

    /// Send a decoded message.
    pub async fn apply(&self, message: Message) -> Result<Option<FeatureChangeOutcome>, ServerError> {
        self.request(|reply| ServerRequest::Apply { message, reply })
            .await
    }

    /// End the current turn.
    pub async fn end_turn(&self) -> Result<TurnSummary, ServerError> {
        self.request(|reply| ServerRequest::EndTurn { reply }).await?
    }

    /// Copy the game state.
    pub async fn snapshot(&self) -> Result<Game, ServerError> {
        self.request(|reply| ServerRequest::Snapshot { reply }).await
    }

    /// Take the queued outbound messages.
    pub async fn drain_outbound(&self) -> Result<Vec<Message>, ServerError> {
        self.request(|reply| ServerRequest::DrainOutbound { reply })
            .await
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        self.requests
            .send(ServerRequest::Shutdown)
            .await
            .map_err(|_| ServerError::Closed)?;
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| ServerError::Closed)?;
        }
        Ok(())
    }
}
