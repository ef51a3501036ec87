//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit outside the handlers, namely
//! trace correlation and persistent ("remember me") logins.

pub mod remember_me;
pub mod trace;

pub use remember_me::{ForgetLogin, REMEMBER_COOKIE_NAME, RememberLogin, RememberMe};
pub use trace::Trace;
