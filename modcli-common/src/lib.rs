//! Shared documentation model for modcli.
//!
//! These types describe what a documented export accepts. They are produced by
//! the modcli resolver and read (never mutated) by help renderers and invokers.

mod doc;

pub use doc::{Documentation, ParameterTag};
