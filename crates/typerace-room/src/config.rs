//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Policy knobs shared by every room a [`RoomRegistry`](crate::RoomRegistry)
/// creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum members with the `player` role. Spectators and admins are
    /// not counted.
    pub max_players: usize,

    /// Whether a `player` may join while a game is `playing`. Late
    /// joiners start with empty input and are never force-finished.
    pub allow_late_join: bool,

    /// How long an empty room is kept before its actor stops. Zero stops
    /// it as soon as the last member leaves.
    pub empty_room_ttl: Duration,

    /// Language selector used when `start_game` doesn't name one.
    pub default_language: String,

    /// Capacity of each room actor's command queue.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 4,
            allow_late_join: true,
            empty_room_ttl: Duration::ZERO,
            default_language: "english".to_string(),
            channel_size: 64,
        }
    }
}
