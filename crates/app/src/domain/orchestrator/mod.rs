//! Job Orchestrator

pub mod engine;
pub mod errors;
pub mod models;
mod service;

pub use errors::OrchestratorError;
pub use service::*;
