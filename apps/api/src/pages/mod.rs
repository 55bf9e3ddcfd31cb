//! Server-rendered HTML pages.

pub mod account;
pub mod auth;
pub mod html;
pub mod public;
