//! Foglio: a dual-homed blogging backend.
//!
//! Posts live in two stores at once: a local Postgres content store
//! (authoritative) and a remote blog service reached over HTTP (mirrored).
//! The application layer orchestrates dual-write on mutation and
//! remote-primary reads with local fallback; the infrastructure layer holds
//! the Postgres repositories, the remote client, and the axum delivery
//! surface.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
