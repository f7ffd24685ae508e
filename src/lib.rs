//! # Table Dataflow
//!
//! > **Reactive data fetching for tabular UI state, built on Tokio.**
//!
//! Given a live stream of query parameters (page, page size, search phrase and a refresh
//! token), this crate produces a live stream of fetch results. Optional decorators add
//! reference resolution, client-side filtering/sorting/pagination and polling, and a
//! state composer folds everything together with UI-only state (selection, expansion)
//! into one snapshot per change.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Stream in, stream out
//!
//! Every stage implements one contract, [`DataGetter`](framework::DataGetter): it takes a
//! [`Feed`](framework::Feed) of parameter snapshots and returns a feed of
//! [`FetchState`](framework::FetchState)s. A decorator takes a getter and returns a
//! getter, so features stack:
//!
//! ```text
//! params ──► BaseFetcher ──► RefResolver ──► ClientSidePaginator ──► Poller
//!        ──► TableStateProvider ──► UI
//! ```
//!
//! ### Refresh is explicit
//!
//! Only a change of [`RequestId`](model::RequestId) issues a new request. Page, page
//! size and search phrase edits change the *view*: a server-paginated table pairs them
//! with [`refresh`](lifecycle::TableStateProvider::refresh), while a client-side table
//! re-slices the rows it already has and never touches the network.
//!
//! ## 🚀 Core Concepts
//!
//! ### Stores and feeds
//! A [`Store`](framework::Store) is a shared, replaying broadcast container on top of
//! `tokio::sync::watch`: late readers get the latest value straight away, and unchanged
//! writes are dropped. Readers hold cheap [`Feed`](framework::Feed) clones.
//!
//! ### One task per composition point
//! Each getter call spawns a task that owns its state and handles events one at a
//! time (no locks around state). When the last reader of its output goes away the task
//! stops and drops its own inputs, so an entire pipeline tears down from the bottom.
//!
//! ### Switch to latest
//! A newer request id drops the in-flight request future. A superseded response can
//! never overwrite newer state.
//!
//! ### Errors are values
//! A failed fetch is published as `Some(Err(..))` inside the fetch state. No stage ends
//! its feed because of it, and a later refresh recovers.
//!
//! ### Mocking
//! [`MockFetch`](framework::mock::MockFetch) scripts responses, including deferred ones
//! that a test completes by hand, which is how cancellation is exercised.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Stores, feeds and the getter/fetch contracts.
//! - **Key items**: [`Store`](framework::Store), [`Feed`](framework::Feed),
//!   [`DataGetter`](framework::DataGetter), [`Fetch`](framework::Fetch).
//!
//! ### 2. The Pipeline ([`getters`])
//! - **Role**: The base fetcher and every decorator.
//! - **Key items**: [`BaseFetcher`](getters::BaseFetcher), [`RefResolver`](getters::RefResolver),
//!   [`ClientSidePaginator`](getters::ClientSidePaginator), [`Poller`](getters::Poller),
//!   [`DataGetterExt`](getters::DataGetterExt).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! - **Role**: Owns the stores of one table, wires the getter in and composes snapshots.
//! - **Key items**: [`TableStateProvider`](lifecycle::TableStateProvider),
//!   [`TableConfig`](lifecycle::TableConfig), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ### 4. The Edges ([`clients`], [`model`])
//! - **Role**: The HTTP adapter and the plain data types flowing through a pipeline.
//!
//! ## 🚀 Quick Start
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod getters;
pub mod lifecycle;
pub mod model;
