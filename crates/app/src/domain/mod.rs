//! Testgenium Domain Concerns

pub mod entitlements;
pub mod jobs;
pub mod orchestrator;
pub mod tenants;
