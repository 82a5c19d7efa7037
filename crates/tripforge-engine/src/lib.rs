pub mod config;
pub mod orchestrator;
pub mod page;
pub mod primitives;
pub mod report;
pub mod submit;

// Re-export the shared types so drivers and callers only need the engine.
pub use tripforge_core::adapter;
pub use tripforge_core::error;
pub use tripforge_core::model;
pub use tripforge_core::protocol;
