//! Test helpers for cityrate-client integration tests
//!
//! - FakeBackend: in-process rating service on an ephemeral port

#![allow(dead_code)]

pub mod fake_backend;

pub use fake_backend::{sample_cities, BackendState, FakeBackend};
