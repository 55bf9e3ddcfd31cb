pub mod resume;
pub mod template;
pub mod user;
pub mod website;
