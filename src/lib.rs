//! Client-side session layer for the Fluence chat service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session store (the single source of truth for the
//!   authenticated user and the channel lists known per server), the one-shot
//!   session bootstrap, and the confirm-then-commit action surface that is the
//!   only path through which the store is mutated.
//! - [`api`] defines the entity and payload shapes exchanged with the backend
//!   and the [`api::transport::ChatTransport`] seam, together with its
//!   HTTP implementation.
//! - [`cli`] provides the command-line surface that drives a session from a
//!   terminal.
//!
//! The runtime entrypoint lives in the binary crate (`src/main.rs`) and
//! routes through [`cli::run`].

pub mod api;
pub mod cli;
pub mod core;

#[cfg(test)]
pub(crate) mod test_support;
