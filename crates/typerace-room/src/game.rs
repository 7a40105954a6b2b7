//! The room state machine.
//!
//! [`GameRoom`] holds one room's membership and game lifecycle and turns
//! each request into the event the room should broadcast. It does no I/O
//! and reads no clock: callers pass `now`, which keeps every transition
//! deterministic under test. The room actor owns exactly one `GameRoom`
//! and is the only thing that mutates it.

use std::time::Instant;

use typerace_protocol::{GameState, PlayerView, Role, RoomId, RoomSnapshot, ServerEvent};

use crate::registry::{ActiveGame, InputOutcome, Player, PlayerRegistry};
use crate::{RoomConfig, RoomError, SentenceProvider};

/// One room: members, lifecycle state and the current game.
#[derive(Debug)]
pub struct GameRoom {
    room_id: RoomId,
    config: RoomConfig,
    registry: PlayerRegistry,
    state: GameState,
    target_sentence: Option<String>,
    start_time: Option<Instant>,
    winner: Option<String>,
}

impl GameRoom {
    pub fn new(room_id: RoomId, config: RoomConfig) -> Self {
        Self {
            room_id,
            config,
            registry: PlayerRegistry::new(),
            state: GameState::Waiting,
            target_sentence: None,
            start_time: None,
            winner: None,
        }
    }

    /// Adds a member. Valid in every state, subject to the room policy.
    ///
    /// A `player` joining mid-game starts with empty input and simply
    /// trails the others.
    ///
    /// # Errors
    /// - [`RoomError::DuplicateNickname`]
    /// - [`RoomError::RoomFull`] when every `player` slot is taken
    /// - [`RoomError::InvalidState`] for a `player` joining a running game
    ///   while late joins are disabled
    pub fn join(&mut self, nickname: &str, role: Role) -> Result<RoomSnapshot, RoomError> {
        if self.registry.contains(nickname) {
            return Err(RoomError::DuplicateNickname(nickname.to_string()));
        }
        if role == Role::Player {
            if self.registry.count_role(Role::Player) >= self.config.max_players {
                return Err(RoomError::RoomFull(self.room_id.clone()));
            }
            if self.state == GameState::Playing && !self.config.allow_late_join {
                return Err(RoomError::InvalidState(
                    "cannot join as a player while a game is running".into(),
                ));
            }
        }
        self.registry.add_player(nickname, role)?;
        tracing::info!(
            room_id = %self.room_id,
            nickname,
            %role,
            state = %self.state,
            members = self.registry.len(),
            "member joined"
        );
        Ok(self.snapshot())
    }

    /// Removes a member. Absent nicknames are a no-op.
    ///
    /// Leaving never re-evaluates the winner: an unfinished player just
    /// disappears from the next broadcast.
    pub fn leave(&mut self, nickname: &str) -> Option<Player> {
        let player = self.registry.remove_player(nickname)?;
        tracing::info!(
            room_id = %self.room_id,
            nickname,
            members = self.registry.len(),
            "member left"
        );
        Some(player)
    }

    /// Starts a game. `language` falls back to the configured default.
    ///
    /// # Errors
    /// - [`RoomError::UnknownPlayer`]
    /// - [`RoomError::Unauthorized`] unless the initiator is an admin
    /// - [`RoomError::InvalidState`] unless the room is `waiting`
    pub fn start(
        &mut self,
        nickname: &str,
        language: Option<&str>,
        sentences: &dyn SentenceProvider,
        now: Instant,
    ) -> Result<ServerEvent, RoomError> {
        self.require_admin(nickname, "start")?;
        if !self.state.can_start() {
            return Err(RoomError::InvalidState(format!(
                "cannot start a game while {}",
                self.state
            )));
        }

        let language = language.unwrap_or(&self.config.default_language);
        let sentence = sentences.sentence(language);
        if sentence.is_empty() {
            return Err(RoomError::InvalidState("no sentence available".into()));
        }

        self.registry.reset_all();
        self.target_sentence = Some(sentence.clone());
        self.start_time = Some(now);
        self.winner = None;
        self.state = GameState::Playing;
        tracing::info!(
            room_id = %self.room_id,
            language,
            players = self.registry.count_role(Role::Player),
            "game started"
        );

        Ok(ServerEvent::GameStarted {
            sentence,
            room_info: self.snapshot(),
        })
    }

    /// Applies a typing update and returns the event to broadcast, or
    /// `None` when the update was ignored.
    ///
    /// The first update that completes the sentence produces `game_over`
    /// instead of `typing_broadcast` and moves the room to `finished`.
    ///
    /// # Errors
    /// - [`RoomError::UnknownPlayer`]
    /// - [`RoomError::Unauthorized`] for spectators and admins
    /// - [`RoomError::GameNotActive`] unless the room is `playing`
    pub fn typing(
        &mut self,
        nickname: &str,
        text: &str,
        now: Instant,
    ) -> Result<Option<ServerEvent>, RoomError> {
        let game = match (&self.target_sentence, self.start_time) {
            (Some(target), Some(start)) if self.state.accepts_input() => Some(ActiveGame {
                target,
                elapsed: now.saturating_duration_since(start),
            }),
            _ => None,
        };

        let outcome = self.registry.update_input(nickname, text, game)?;
        let finish_time = match outcome {
            InputOutcome::Ignored => return Ok(None),
            InputOutcome::Updated => None,
            InputOutcome::Finished { finish_time } => Some(finish_time),
        };

        match finish_time {
            Some(finish_time) if self.winner.is_none() => {
                self.winner = Some(nickname.to_string());
                self.state = GameState::Finished;
                tracing::info!(
                    room_id = %self.room_id,
                    winner = nickname,
                    finish_secs = finish_time.as_secs_f64(),
                    "game over"
                );
                Ok(Some(ServerEvent::GameOver {
                    winner: nickname.to_string(),
                    finish_time: finish_time.as_secs_f64(),
                    room_info: self.snapshot(),
                }))
            }
            _ => Ok(Some(ServerEvent::TypingBroadcast {
                players: self.players(),
            })),
        }
    }

    /// Returns the room to `waiting` and clears every game field.
    ///
    /// # Errors
    /// - [`RoomError::UnknownPlayer`]
    /// - [`RoomError::Unauthorized`] unless the initiator is an admin
    /// - [`RoomError::InvalidState`] while `waiting`
    pub fn reset(&mut self, nickname: &str) -> Result<ServerEvent, RoomError> {
        self.require_admin(nickname, "reset")?;
        if !self.state.can_reset() {
            return Err(RoomError::InvalidState(format!(
                "cannot reset a game while {}",
                self.state
            )));
        }

        self.registry.reset_all();
        self.target_sentence = None;
        self.start_time = None;
        self.winner = None;
        self.state = GameState::Waiting;
        tracing::info!(room_id = %self.room_id, "game reset");

        Ok(ServerEvent::GameReset {
            room_info: self.snapshot(),
        })
    }

    fn require_admin(&self, nickname: &str, action: &str) -> Result<(), RoomError> {
        let player = self
            .registry
            .get(nickname)
            .ok_or_else(|| RoomError::UnknownPlayer(nickname.to_string()))?;
        if !player.role.is_privileged() {
            return Err(RoomError::Unauthorized(format!(
                "only an admin can {action} the game"
            )));
        }
        Ok(())
    }

    /// A consistent picture of the whole room.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            state: self.state,
            target_sentence: self.target_sentence.clone(),
            winner: self.winner.clone(),
            players: self.players(),
            spectator_count: self.registry.count_role(Role::Spectator),
            admin_count: self.registry.count_role(Role::Admin),
        }
    }

    /// Views of the `player`-role members, in join order.
    pub fn players(&self) -> Vec<PlayerView> {
        self.registry.views(self.target_sentence.as_deref())
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn target_sentence(&self) -> Option<&str> {
        self.target_sentence.as_deref()
    }

    pub fn member_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
