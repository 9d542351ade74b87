//! HTTP client for the e-commerce store backend.
//!
//! The store backend is an external REST service exposing products, reviews,
//! and the shopping cart. This crate wraps it behind two layers:
//!
//! - `BackendClient::request` - one transport call with bounded retries and
//!   a small failure taxonomy (not found / status / timeout / unavailable)
//! - the high-level `BackendApi` methods - these never propagate transport
//!   failures; they degrade to empty collections, `None`, or `false` so that
//!   callers only ever have to reason about emptiness
//!
//! `BackendApi` is a trait so the tool layer can be exercised against a
//! scripted in-memory store in tests.

pub mod client;
pub mod error;

pub use client::{filter_products, BackendApi, BackendClient, RetryPolicy};
pub use error::BackendError;
