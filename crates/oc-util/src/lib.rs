//! oc-util - Shared foundation types for the O compiler.
//!
//! This crate holds the pieces every phase depends on: the common
//! [`CompileError`] type and the [`Result`] alias built on it.

mod error;

pub use error::{CompileError, Result};
