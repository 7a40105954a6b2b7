//! Logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `tracing` subscriber that writes formatted events to stdout.
///
/// `RUST_LOG` overrides the filter. Without it, the typerace crates and
/// `binary_name` log at `default_level` and everything else stays quiet.
pub fn init_tracing(binary_name: &str, default_level: &str) {
    let binary = binary_name.replace('-', "_");
    let targets = [
        "typerace",
        "typerace_transport",
        "typerace_session",
        "typerace_room",
        binary.as_str(),
    ];

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                targets
                    .iter()
                    .map(|target| format!("{target}={default_level}"))
                    .collect::<Vec<_>>()
                    .join(",")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
