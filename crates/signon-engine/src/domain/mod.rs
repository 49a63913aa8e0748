//! Domain layer: request lifecycle entities and the request store.

pub mod entities;
pub mod errors;
pub mod store;
