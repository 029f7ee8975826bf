//! HTTP adapter for the remote blog service.

mod client;

pub use client::RemoteBlogClient;
