//! Wire protocol and WebSocket transport

pub mod client;
pub mod protocol;

pub use client::{connect, Connection, TransportError, TransportTasks};
