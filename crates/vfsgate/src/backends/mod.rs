//! Storage backends.
//!
//! Backends implement [`Adapter`](crate::Adapter) for different storage types.

mod memory;

pub use memory::MemoryAdapter;
