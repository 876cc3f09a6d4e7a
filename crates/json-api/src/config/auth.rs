//! Auth Config

use clap::Args;

/// Session token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Hex encoded HMAC key for session tokens (at least 32 bytes)
    #[arg(long, env = "SESSION_SIGNING_KEY", hide_env_values = true)]
    pub session_signing_key: Option<String>,

    /// Session lifetime in hours
    #[arg(long, env = "SESSION_TTL_HOURS", default_value_t = 24)]
    pub session_ttl_hours: i64,
}
