//! Generic dataflow framework for table pipelines.
//!
//! This module provides the building blocks that fetchers, decorators and the state
//! composer are made of.
//!
//! # Main Components
//!
//! - [`Store`] - Owned broadcast container with replay-of-one semantics
//! - [`Feed`] - Cloneable reader of a store or of a composition's output
//! - [`DataGetter`] - Stream-to-stream contract every pipeline stage implements
//! - [`Fetch`] - Single-request contract of an external source
//! - [`FetchError`] / [`SystemError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for a scripted [`Fetch`] implementation.

pub mod core;
pub mod error;
pub mod feed;
pub mod mock;
pub mod store;

pub use self::core::*;
pub use error::{FetchError, SystemError};
pub use feed::Feed;
pub use store::Store;
