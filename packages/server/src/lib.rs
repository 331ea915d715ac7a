// Member Profiles - API Core
//
// Per-field visibility rules for member profile pages, the public member
// listing projection, and the validation/approval workflow that gates
// member login.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
