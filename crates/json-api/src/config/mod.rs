//! Server configuration module

use std::time::Duration;

use clap::Parser;
use jiff::SignedDuration;
use testgenium_app::{auth::SigningKey, context::AppSettings, domain::orchestrator::models::OrchestratorSettings};
use thiserror::Error;

use crate::config::{
    auth::AuthConfig,
    engine::EngineConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
    storage::StorageConfig,
};

pub(crate) mod auth;
pub(crate) mod engine;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod storage;

/// Testgenium JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "testgenium-json", about = "Testgenium JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Where tenants and jobs are kept.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Session token settings.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Assessment engine settings.
    #[command(flatten)]
    pub engine: EngineConfig,
}

/// Settings that parse but cannot be used.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("SESSION_SIGNING_KEY must be hex encoded and at least 32 bytes")]
    SigningKey,

    #[error("SESSION_TTL_HOURS must be between 1 and 8760")]
    SessionTtl,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Application settings derived from the auth and engine sections.
    ///
    /// Without a configured signing key a random one is generated, so
    /// sessions do not survive a restart.
    pub(crate) fn app_settings(&self) -> Result<AppSettings, ConfigError> {
        let signing_key = match &self.auth.session_signing_key {
            Some(hex) => SigningKey::from_hex(hex).map_err(|_invalid| ConfigError::SigningKey)?,
            None => SigningKey::generate(),
        };

        if !(1..=8760).contains(&self.auth.session_ttl_hours) {
            return Err(ConfigError::SessionTtl);
        }

        let mut settings = AppSettings::new(signing_key);

        settings.session_ttl = SignedDuration::from_hours(self.auth.session_ttl_hours);
        settings.engine_delay = Duration::from_millis(self.engine.engine_delay_ms);
        settings.orchestrator = OrchestratorSettings {
            engine_timeout: Duration::from_secs(self.engine.engine_timeout_seconds),
            expected_duration: Duration::from_millis(
                self.engine
                    .engine_expected_duration_ms
                    .unwrap_or(self.engine.engine_delay_ms),
            ),
            ..OrchestratorSettings::default()
        };

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn parse(args: &[&str]) -> Result<ServerConfig, clap::Error> {
        ServerConfig::try_parse_from(std::iter::once("testgenium-json").chain(args.iter().copied()))
    }

    #[test]
    fn engine_settings_follow_flags() -> TestResult {
        let config = parse(&[
            "--storage-backend",
            "memory",
            "--engine-delay-ms",
            "250",
            "--engine-timeout-seconds",
            "2",
            "--session-ttl-hours",
            "1",
        ])?;

        let settings = config.app_settings()?;

        assert_eq!(settings.engine_delay, Duration::from_millis(250));
        assert_eq!(settings.orchestrator.engine_timeout, Duration::from_secs(2));
        assert_eq!(
            settings.orchestrator.expected_duration,
            Duration::from_millis(250),
            "progress horizon defaults to the demo delay"
        );
        assert_eq!(settings.session_ttl, SignedDuration::from_hours(1));

        Ok(())
    }

    #[test]
    fn short_signing_key_is_rejected() -> TestResult {
        let config = parse(&["--storage-backend", "memory", "--session-signing-key", "abcd"])?;

        assert!(matches!(config.app_settings(), Err(ConfigError::SigningKey)));

        Ok(())
    }

    #[test]
    fn zero_ttl_is_rejected() -> TestResult {
        let config = parse(&["--storage-backend", "memory", "--session-ttl-hours", "0"])?;

        assert!(matches!(config.app_settings(), Err(ConfigError::SessionTtl)));

        Ok(())
    }
}
