//! Integration tests: requester and responder engines wired over the
//! in-memory relay.

pub mod flows;
pub mod wire;
