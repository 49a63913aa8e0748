//! # Signon Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate choreography
//!     ├── flows.rs      # Full exchanges over the in-memory relay
//!     └── wire.rs       # Wire-format compatibility and delivery edges
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p signon-tests
//!
//! # By category
//! cargo test -p signon-tests integration::
//! ```

pub mod integration;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a tracing subscriber honoring `RUST_LOG`, once per process.
/// Tests call this so engine logs show up under `RUST_LOG=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

