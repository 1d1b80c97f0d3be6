//! Core types and decision logic for the Restock reorder planner.
//!
//! This crate is deliberately free of HTTP and database dependencies. It turns
//! a per-SKU demand forecast into reorder triggers ([`trigger`]) and a
//! budget-bounded purchase plan ([`optimize`]). Every computation here is pure:
//! the same inputs always yield the same output and nothing is mutated on
//! failure.

pub mod enrich;
pub mod error;
pub mod optimize;
pub mod producer;
pub mod record;
pub mod store;
pub mod trigger;

pub use error::{Error, Result};
