//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! Log lines use the compact format without the module prefix (`with_target(false)`).
//! Levels are picked through the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Lifecycle** (`info`): tables, fetchers and pollers starting and stopping, refreshes
//! - **Emissions** (`debug`): request ids, params updates, filtered row counts
//! - **Page windows** (`trace`): the slice bounds of every client-side page
//! - **Failures** (`warn`): failed fetches with their error
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info cargo run
//!
//! # Every request and params update
//! RUST_LOG=debug cargo run
//!
//! # Filter to the getters
//! RUST_LOG=table_dataflow::getters=trace cargo run
//! ```
//!
//! With `RUST_LOG=debug` a search followed by a refresh reads:
//!
//! ```text
//! DEBUG set_search_phrase{phrase="dog"}: Params updated params=TableDataParams { .. }
//! DEBUG Rows filtered fetched=200 selected=4 search_phrase="dog"
//! INFO refresh: Refresh request_id=5b0c..
//! DEBUG Fetch request_id=5b0c.. page=1 page_size=15
//! ```

/// Installs the global compact subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact() // Compact format shows spans inline (e.g., "refresh: Refresh")
        .init();
}
