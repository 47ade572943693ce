//! # Relay Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── calculator.rs    # Shared fixture: service + hand-expanded proxy pair
//!     ├── end_to_end.rs    # Full exchanges over the in-memory bus
//!     ├── lifecycle.rs     # Idle-timeout and close semantics
//!     └── generation.rs    # Generator output against the fixture pair
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p relay-tests
//!
//! # By category
//! cargo test -p relay-tests integration::lifecycle
//! ```

#![allow(dead_code)]


/// Install the test log subscriber; later calls are no-ops.
#[cfg(test)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
