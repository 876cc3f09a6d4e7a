//! Engine Config

use clap::Args;

/// Assessment engine settings.
#[derive(Debug, Args)]
pub struct EngineConfig {
    /// Delay before the demo engine reports its finding
    #[arg(long, env = "ENGINE_DELAY_MS", default_value_t = 5_000_u64)]
    pub engine_delay_ms: u64,

    /// Upper bound on one engine invocation
    #[arg(long, env = "ENGINE_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub engine_timeout_seconds: u64,

    /// Horizon of the progress estimate; defaults to the engine delay
    #[arg(long, env = "ENGINE_EXPECTED_DURATION_MS")]
    pub engine_expected_duration_ms: Option<u64>,
}
