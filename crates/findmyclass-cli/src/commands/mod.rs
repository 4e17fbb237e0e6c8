pub mod auth;
pub mod config;
pub mod grid;
pub mod session;
pub mod sync;
