//! Integration test suite
//!
//! Runs the public API end to end: concrete scenarios and properties that
//! must hold for arbitrary text.

mod properties;
mod scenarios;
