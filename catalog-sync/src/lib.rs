//! Station catalog service for a radio player.
//!
//! Keeps a local list of stations in step with a remotely published
//! catalog. Startup never waits on the network: the bundled catalog or a
//! previously cached copy is always available, and a background
//! reconciliation adopts the remote catalog when its version changes.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod web;
