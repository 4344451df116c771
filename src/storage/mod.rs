//! # Storage Module
//!
//! The persistence layer: a key-value primitive ([`KeyValueStore`]) with
//! in-memory and file-backed implementations, and the [`Database`] handle
//! that layers the app's five JSON collections on top of it.

pub mod database;
pub mod kv;

pub use database::{keys, Database, SEED_ADMIN, SEED_TECH};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
