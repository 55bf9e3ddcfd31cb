pub mod domain;
pub mod handlers;
pub mod render;
pub mod repo;
