//! Combat Bridge - connects a tick-driven combat simulation to a remote
//! decision service

pub mod bridge;
pub mod core;
pub mod host;
pub mod protocol;
