//! Marketstall Core - Shared types library.
//!
//! This crate provides the types shared by all Marketstall components:
//! - `storefront` - Cart store, catalog pipeline, checkout and the JSON API
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, and product/category snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
