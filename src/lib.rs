//! # Photo Dedup
//!
//! Finds duplicate photos in large collections by perceptual fingerprint.
//!
//! ## Core Philosophy
//! - **Never delete** - the engine only reports; review happens elsewhere
//! - **Never hash twice** - fingerprints persist in a path-keyed cache
//! - **Exact groups** - photos are grouped by identical fingerprints only
//!
//! ## Architecture
//! - `core` - Scanner, hasher, cache, pipeline, grouper and reporter
//! - `events` - Event-driven progress reporting
//! - `error` - Typed error taxonomy
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DuplicateFinderError, Result};

/// Initialize tracing for the library
///
/// `default_directive` is used when `RUST_LOG` is not set.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A subscriber may already be installed (e.g. by an embedding application)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
