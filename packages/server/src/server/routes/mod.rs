// HTTP routes
pub mod admin;
pub mod error;
pub mod health;
pub mod members;

pub use error::{ApiError, ApiResult};
pub use health::*;
