// ============================
// worksphere-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod token;
mod service;
mod service_impl;

pub use token::{TokenError, TokenService};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
