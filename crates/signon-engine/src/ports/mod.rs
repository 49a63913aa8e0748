//! Ports layer: inbound API and outbound gateway traits.

pub mod inbound;
pub mod outbound;
