//! Player registry: the members of one room and their per-game fields.

use std::time::Duration;

use typerace_protocol::{PlayerView, Role, TypingError};

use crate::RoomError;
use crate::progress::{cap_input, compute_errors, progress_percent};

/// One member of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub nickname: String,
    pub role: Role,
    pub current_input: String,
    pub errors: Vec<TypingError>,
    pub is_finished: bool,
    pub finish_time: Option<Duration>,
}

impl Player {
    fn new(nickname: String, role: Role) -> Self {
        Self {
            nickname,
            role,
            current_input: String::new(),
            errors: Vec::new(),
            is_finished: false,
            finish_time: None,
        }
    }

    fn clear_game_fields(&mut self) {
        self.current_input.clear();
        self.errors.clear();
        self.is_finished = false;
        self.finish_time = None;
    }

    /// Renders the player for the wire. `target` is the active sentence,
    /// if any, and only feeds `progress`.
    pub fn view(&self, target: Option<&str>) -> PlayerView {
        PlayerView {
            nickname: self.nickname.clone(),
            role: self.role,
            current_input: self.current_input.clone(),
            errors: self.errors.clone(),
            is_finished: self.is_finished,
            finish_time: self.finish_time.map(|d| d.as_secs_f64()),
            progress: target.map_or(0, |t| progress_percent(t, &self.current_input)),
        }
    }
}

/// The game a typing update is scored against.
#[derive(Debug, Clone, Copy)]
pub struct ActiveGame<'a> {
    pub target: &'a str,
    /// Time since the game started, recorded as the finish time when the
    /// update completes the sentence.
    pub elapsed: Duration,
}

/// What an accepted typing update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The player had already finished; nothing changed.
    Ignored,
    /// Input and errors were replaced.
    Updated,
    /// This update completed the sentence.
    Finished { finish_time: Duration },
}

/// Members of a room in join order. Nicknames are unique.
///
/// Rooms are small, so a `Vec` with linear lookup keeps join order for
/// display without a second index.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member with empty game fields.
    ///
    /// # Errors
    /// Returns [`RoomError::DuplicateNickname`] if the nickname is taken.
    pub fn add_player(&mut self, nickname: &str, role: Role) -> Result<&Player, RoomError> {
        if self.contains(nickname) {
            return Err(RoomError::DuplicateNickname(nickname.to_string()));
        }
        self.players.push(Player::new(nickname.to_string(), role));
        let index = self.players.len() - 1;
        Ok(&self.players[index])
    }

    /// Removes a member. Absent nicknames are a no-op.
    pub fn remove_player(&mut self, nickname: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.nickname == nickname)?;
        Some(self.players.remove(index))
    }

    /// Replaces a player's input and re-scores it.
    ///
    /// Checks run in this order: unknown nickname, non-player role,
    /// already finished (ignored, not an error), no active game. Input
    /// longer than the target is capped before it is stored.
    ///
    /// # Errors
    /// - [`RoomError::UnknownPlayer`]
    /// - [`RoomError::Unauthorized`] for spectators and admins
    /// - [`RoomError::GameNotActive`] when `game` is `None`
    pub fn update_input(
        &mut self,
        nickname: &str,
        text: &str,
        game: Option<ActiveGame<'_>>,
    ) -> Result<InputOutcome, RoomError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.nickname == nickname)
            .ok_or_else(|| RoomError::UnknownPlayer(nickname.to_string()))?;

        if player.role != Role::Player {
            return Err(RoomError::Unauthorized(format!(
                "{} members cannot type",
                player.role
            )));
        }
        if player.is_finished {
            return Ok(InputOutcome::Ignored);
        }
        let game = game.ok_or(RoomError::GameNotActive)?;

        let input = cap_input(game.target, text);
        player.errors = compute_errors(game.target, &input);
        player.current_input = input;

        if player.current_input == game.target {
            player.is_finished = true;
            player.finish_time = Some(game.elapsed);
            return Ok(InputOutcome::Finished {
                finish_time: game.elapsed,
            });
        }
        Ok(InputOutcome::Updated)
    }

    /// Clears every member's input, errors and finish fields.
    pub fn reset_all(&mut self) {
        self.players.iter_mut().for_each(Player::clear_game_fields);
    }

    pub fn get(&self, nickname: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.nickname == nickname)
    }

    pub fn contains(&self, nickname: &str) -> bool {
        self.get(nickname).is_some()
    }

    /// Views of the `player`-role members, in join order.
    pub fn views(&self, target: Option<&str>) -> Vec<PlayerView> {
        self.players
            .iter()
            .filter(|p| p.role == Role::Player)
            .map(|p| p.view(target))
            .collect()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.players.iter().filter(|p| p.role == role).count()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }
}
