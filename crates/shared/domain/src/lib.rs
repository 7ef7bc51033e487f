//! # Domain Models
//!
//! Pure types shared by the resolution engine and its hosts: deploy targets, the
//! configuration tree handed to deployment plugins, deferred hooks, and engine settings.
//! Keep it lean: `serde`, `serde_json` and `bitflags` only, no I/O.

pub mod config;
pub mod constants;
pub mod context;
pub mod sections;
pub mod target;
pub mod tree;
