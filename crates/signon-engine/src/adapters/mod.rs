//! Adapters: in-memory implementations of the outbound ports.

pub mod memory;
