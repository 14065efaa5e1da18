//! Storage implementations for the auth core.
//!
//! - **Memory** - in-process map, shared between clones
//! - **File** - a single JSON document on disk, rewritten on every write

pub mod file;
pub mod memory;

// Re-exports
pub use file::FileStorage;
pub use memory::MemoryStorage;
