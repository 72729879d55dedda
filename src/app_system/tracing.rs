/// Configure tracing once at application startup for the entire process.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (for example
/// `info` or `user_directory=debug`) is used. Output uses the compact
/// formatter with an uptime timer.
///
/// ```bash
/// RUST_LOG=debug user_directory                 # Show debug logs
/// user_directory --log-level warn               # Warnings and errors only
/// RUST_LOG=user_directory::actor_framework=debug,tower_http=info user_directory
/// ```
pub fn setup_tracing(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
