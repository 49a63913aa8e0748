//! # Shared Types Crate
//!
//! Domain entities and wire payloads shared between the requester ("dApp")
//! and responder ("wallet") sides of the signon auth protocol.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Wire Stability**: Both sides independently re-derive the canonical
//!   sign-in message from these types, so field names and serialized shapes
//!   are a compatibility contract, not an implementation detail.

pub mod entities;
pub mod errors;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use wire::*;
