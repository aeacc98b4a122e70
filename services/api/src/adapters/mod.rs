//! services/api/src/adapters/mod.rs
//!
//! Concrete implementations of the `core` crate's service ports.

pub mod backends;
pub mod db;
pub mod details_llm;
pub mod page_reader;
pub mod sst;
pub mod storage;
pub mod title_llm;
