//! Test infrastructure for the specification engine.
//!
//! Fixtures describe a small customer domain with named Specification
//! factories; the harness seeds the same dataset into every backend so tests
//! can compare them.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
