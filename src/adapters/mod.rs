//! In-process implementations of the domain ports.

pub mod agents;
