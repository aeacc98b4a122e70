//! services/api/src/lib.rs
//!
//! Library surface of the `api` service, shared by the binaries and the
//! integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod extraction;
pub mod web;
