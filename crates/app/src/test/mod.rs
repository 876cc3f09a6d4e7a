//! Shared test infrastructure.

pub(crate) mod clock;
pub(crate) mod context;
pub(crate) mod db;
pub(crate) mod engine;

pub(crate) use context::TestContext;
