//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value contract the studio store persists through.
//! - Keep SQLite details out of the store and ledger.
//!
//! # Invariants
//! - Values are JSON text shaped exactly like the in-memory entities.
//! - A missing key loads as the type's default.

pub mod kv_store;
pub mod settings;
