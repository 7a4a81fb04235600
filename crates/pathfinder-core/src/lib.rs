//! Core types and the combination generator for PathFinder.
//!
//! This crate is deliberately free of HTTP and database dependencies. It knows
//! how to turn a stream's eligibility rule into the canonical set of A/L
//! subject triples, and how to drive a full regeneration through any
//! [`store::CombinationStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod catalogue;
pub mod combination;
pub mod error;
pub mod generate;
pub mod regenerate;
pub mod rule;
pub mod store;
pub mod stream;
pub mod summary;

pub use error::{Error, Result};
