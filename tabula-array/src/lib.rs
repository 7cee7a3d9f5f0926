//! Tabula's in-memory data model: typed nullable [`Column`]s, [`Table`]s of equal-length
//! columns and the [`GroupIndex`] a grouped table carries, plus the compute kernels the
//! expression layer is built on.

pub mod aliases;
mod builder;
mod column;
pub mod compute;
mod group;
mod table;
mod validity;

pub use builder::*;
pub use column::*;
pub use group::*;
pub use table::*;
pub use validity::*;
