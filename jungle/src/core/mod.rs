//! Deterministic, pure logic shared by the jungle engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod retention;
pub mod version;
