pub mod actions;
pub mod bootstrap;
pub mod config;
pub mod session;
