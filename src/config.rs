//! Process configuration from command-line flags and environment variables.

use std::num::NonZeroUsize;

use clap::Parser;

/// In-memory user directory service
#[derive(Parser, Debug, Clone)]
#[command(name = "user_directory")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Pending requests the user actor queues before callers wait
    #[arg(long, env = "CHANNEL_CAPACITY", default_value = "32")]
    pub channel_capacity: NonZeroUsize,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
