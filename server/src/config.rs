use std::time::Duration;

use clap::Parser;

use crate::lifecycle::DEFAULT_GRACE_PERIOD;

/// In-memory todo HTTP service.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Seconds in-flight requests may run after a shutdown signal
    #[arg(long, default_value_t = DEFAULT_GRACE_PERIOD.as_secs())]
    pub shutdown_grace_secs: u64,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
