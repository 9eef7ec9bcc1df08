//! Shared helpers that do not belong to a single component.

mod dot;

pub use dot::{escape_dot, quote_id};
