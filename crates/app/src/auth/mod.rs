//! Authentication

mod errors;
mod passwords;
mod service;
mod token;

pub use errors::*;
pub use passwords::PasswordHasher;
pub use service::*;
pub use token::*;
