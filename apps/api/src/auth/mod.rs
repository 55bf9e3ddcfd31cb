//! Accounts and sessions: credential sign-in, registration, the session
//! cookie and the page guard that depends on it.

pub mod credentials;
pub mod error_codes;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod session;
pub mod validation;

pub use session::{AuthUser, SessionBackend};
