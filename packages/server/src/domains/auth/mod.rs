//! Authentication - bearer tokens identifying the acting member

pub mod jwt;

pub use jwt::{Claims, JwtService};
