//! Server configuration.
//!
//! [`ServerArgs`] is the binary's command line. Every flag falls back to
//! a `TYPERACE_*` environment variable, then to the default shown in
//! `--help`. [`ServerConfig`] is what the builder consumes.

use std::time::Duration;

use clap::builder::{BoolishValueParser, NonEmptyStringValueParser};
use clap::{ArgAction, Parser};
use typerace_room::RoomConfig;

pub const ENV_BIND: &str = "TYPERACE_BIND";
pub const ENV_DEFAULT_ROOM: &str = "TYPERACE_DEFAULT_ROOM";
pub const ENV_MAX_PLAYERS: &str = "TYPERACE_MAX_PLAYERS";
pub const ENV_ALLOW_LATE_JOIN: &str = "TYPERACE_ALLOW_LATE_JOIN";
pub const ENV_ROOM_TTL_SECS: &str = "TYPERACE_ROOM_TTL_SECS";
pub const ENV_LANGUAGE: &str = "TYPERACE_LANGUAGE";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "typerace-server", version)]
#[command(about = "Real-time multiplayer typing-race server", long_about = None)]
pub struct ServerArgs {
    /// Address the WebSocket listener binds to
    #[arg(
        short,
        long,
        env = ENV_BIND,
        default_value = "127.0.0.1:8080",
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub bind: String,

    /// Room used by join_game events that don't name one
    #[arg(
        long,
        env = ENV_DEFAULT_ROOM,
        default_value = "lobby",
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub default_room: String,

    /// Players per room (spectators and admins don't count)
    #[arg(
        long,
        env = ENV_MAX_PLAYERS,
        default_value_t = 4,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub max_players: u16,

    /// Whether players may join a game already in progress
    #[arg(
        long,
        env = ENV_ALLOW_LATE_JOIN,
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub allow_late_join: bool,

    /// Seconds an empty room is kept before eviction (0 evicts at once)
    #[arg(long, env = ENV_ROOM_TTL_SECS, default_value_t = 0)]
    pub room_ttl_secs: u64,

    /// Sentence language when start_game doesn't name one
    #[arg(
        long,
        env = ENV_LANGUAGE,
        default_value = "english",
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub language: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Room used by `join_game` events that don't name one.
    pub default_room: String,
    /// Policy applied to every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            default_room: "lobby".to_string(),
            room: RoomConfig::default(),
        }
    }
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            bind_addr: args.bind,
            default_room: args.default_room,
            room: RoomConfig {
                max_players: usize::from(args.max_players),
                allow_late_join: args.allow_late_join,
                empty_room_ttl: Duration::from_secs(args.room_ttl_secs),
                default_language: args.language,
                ..RoomConfig::default()
            },
        }
    }
}
