//! Infrastructure adapters: persistence, remote HTTP client, delivery, telemetry.

pub mod db;
pub mod error;
pub mod http;
pub mod remote;
pub mod telemetry;
