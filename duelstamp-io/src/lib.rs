//! Frame access and file I/O for the analyzer.
//!
//! Everything here is synchronous; the sampling loop owns all of it
//! exclusively, so nothing needs locking.

pub mod assets;
pub mod output;
pub mod store;
pub mod time;

pub use store::{Frame, FrameSource, FrameStore, StoreConfig, StoreError};
