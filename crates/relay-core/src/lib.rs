//! Core domain logic for the badge relay.
//!
//! Holds the per-source notification registry, the status renderer that
//! turns registry snapshots into the single badge string, the icon table,
//! and the validated runtime configuration. Everything here is synchronous
//! and runtime-agnostic; the long-running tasks live in `relay-runtime`.

pub mod error;
pub mod icons;
pub mod registry;
pub mod render;
pub mod settings;
