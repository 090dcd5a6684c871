//! Long-running tasks for the badge relay.
//!
//! Hosts the two concurrent halves of the daemon: the ingress listener that
//! accepts notification reports from web applications, and the periodic
//! publisher that evicts stale state, renders the badge string and writes it
//! to the status file.

pub mod ingress;
pub mod publisher;

pub use relay_core as core;
