//! Core domain and configuration for the carta shopping assistant.
//!
//! This crate holds everything the other crates share:
//! - **Domain types** (`domain`) - products, reviews, cart items, chat messages
//! - **Configuration** (`config`) - layered load from file, environment, and
//!   programmatic overrides
//! - **Error taxonomy** (`errors`) - stable error kinds with user-facing
//!   messages and retry hints
//! - **Suggestions** (`suggestions`) - follow-up suggestion heuristics
//!
//! Nothing in here performs I/O beyond reading the config file; the HTTP
//! client and the agent runtime live in their own crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod suggestions;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::cart::{CartItem, CartSummary};
pub use domain::conversation::{ChatMessage, Role};
pub use domain::product::{average_rating, Product, Review};
pub use errors::{ChatError, ErrorKind};
