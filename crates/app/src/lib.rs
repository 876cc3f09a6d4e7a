//! Job orchestration, entitlement gating and session handling for the
//! Testgenium assessment service.

pub mod auth;
pub mod client;
pub mod clock;
pub mod context;
pub mod database;
pub mod domain;
pub mod seed;
pub mod uuids;

#[cfg(test)]
mod test;
