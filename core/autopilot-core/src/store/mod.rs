//! Persistence: the key-value collaborator and the typed record layer
//! built on top of it.

pub mod kv;
pub mod records;

pub use kv::{KvStore, MemoryKv};
