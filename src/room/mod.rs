// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use registry::{RegistryHandle, RoomRegistry};

// Internal modules
mod cleanup_task;
pub mod models;
pub mod registry;
