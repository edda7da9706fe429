//! Bookshelf application library
//!
//! Application modules plus the bootstrap shared by the server binary and the CLI.

pub mod app;
pub mod modules;

pub use app::{build_registry, migrate, serve};
pub use modules::books;
