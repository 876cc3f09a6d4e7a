//! Entitlements

pub mod errors;
mod ledger;

pub use errors::EntitlementError;
pub use ledger::*;
