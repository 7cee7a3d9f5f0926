#![deny(missing_docs)]

//! A type system for Tabula
//!
//! This crate contains the closed set of logical types a column can carry, along with the
//! field-name aliases shared by tables, selectors and expressions.

pub use dtype::*;
pub use field::*;

mod dtype;
mod field;
