//! Production-settings block generation and idempotent patching

pub mod block;
pub mod patch;

pub use block::{ProductionBlock, BLOCK_BEGIN, BLOCK_END};
pub use patch::{apply_to_file, patch};
