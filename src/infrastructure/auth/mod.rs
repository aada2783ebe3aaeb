//! Authentication infrastructure module
//!
//! JWT tokens for the admin API.

mod jwt;

pub use jwt::{AdminClaims, JwtConfig, JwtService};
