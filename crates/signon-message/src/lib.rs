//! # Sign-In Message Formatter
//!
//! Renders structured sign-in parameters into the exact byte sequence that
//! must be signed, and validates parameters before they are sent or acted on.
//!
//! ## Determinism
//!
//! `render_message` is pure: identical inputs always yield byte-identical
//! output. The responder signs the rendering of the params it received, and
//! the requester independently re-renders from its locally stored params;
//! the two renderings must hash-match for signature verification to succeed.

pub mod errors;
pub mod render;
pub mod validate;

pub use errors::FormatError;
pub use render::render_message;
pub use validate::{validate, validate_at};
