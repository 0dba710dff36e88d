//! devspec Library
//!
//! Resolves device capabilities (processor, screen, battery, storage, RAM)
//! from a configured override table and layered host sources.

pub mod cli;
pub mod config_file;
pub mod engine;
pub mod error;
pub mod hardware;
pub mod logic;
pub mod types;

// Re-export main types for convenience
pub use config_file::{DevspecConfig, HostConfig, OverrideTable};
pub use error::{Result, SpecError};
pub use hardware::{
    BlockStats, DisplayGeometry, DisplayService, FilesystemStats, HostProviders, MemInfoSource,
    PowerProfile, PowerProfileSource, PropertyStore,
};
pub use logic::chain::{ChainHit, SourceChain};
pub use logic::resolver::{CapabilityReport, CapabilityResolver};
pub use types::{CapabilityKind, StorageBucket};
