//! Adapters to external data sources.

#[cfg(feature = "http")]
pub mod http;
pub mod query;

#[cfg(feature = "http")]
pub use http::HttpFetch;
pub use query::QueryMapper;
