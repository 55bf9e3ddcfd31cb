pub mod catalog;
pub mod handlers;
pub mod repo;

pub use catalog::Theme;
