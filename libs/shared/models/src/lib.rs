pub mod auth;
pub mod error;

pub use auth::{IdentityProvider, User};
pub use error::AppError;
