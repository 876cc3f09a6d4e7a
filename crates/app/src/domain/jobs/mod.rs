//! Jobs

pub mod data;
pub mod errors;
mod memory;
pub mod records;
mod repository;
pub mod service;
pub mod summary;

pub use errors::JobsServiceError;
pub use memory::MemoryJobsService;
pub use service::*;
