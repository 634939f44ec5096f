//! Core types and trait definitions for the legal-document store.
//!
//! This crate is free of HTML and database dependencies. The extractor, the
//! SQLite backend and the ingest binary all depend on it.

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod diff;
pub mod error;
pub mod hierarchy;
pub mod history;
pub mod node;
pub mod record;
pub mod source;
pub mod store;

pub use error::{Error, Result};
