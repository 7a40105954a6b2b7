use clap::Parser;
use typerace::prelude::*;

#[tokio::main]
async fn main() -> Result<(), TyperaceError> {
    init_tracing(env!("CARGO_PKG_NAME"), "info");

    let args = ServerArgs::parse();
    let server = TyperaceServer::builder().config(args.into()).build().await?;

    let config = server.config();
    tracing::info!(
        addr = %server.local_addr()?,
        default_room = %config.default_room,
        max_players = config.room.max_players,
        allow_late_join = config.room.allow_late_join,
        room_ttl_secs = config.room.empty_room_ttl.as_secs(),
        language = %config.room.default_language,
        "listening"
    );

    server.run().await
}
