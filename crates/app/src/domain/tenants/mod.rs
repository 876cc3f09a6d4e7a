//! Tenants

pub mod data;
pub mod errors;
mod memory;
pub mod records;
mod repository;
pub mod service;

pub use errors::TenantsServiceError;
pub use memory::MemoryTenantsService;
pub use service::*;
