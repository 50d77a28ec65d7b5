//! Resume checkpoint persistence.

mod checkpoint;

// Re-export public API
pub use checkpoint::CheckpointStore;
