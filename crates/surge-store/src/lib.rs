// ABOUTME: Persistence layer for surgesense: the hospital snapshot document store
// ABOUTME: and the synthetic snapshot generator that feeds it on a timer.

pub mod generator;
pub mod store;

pub use generator::SnapshotGenerator;
pub use store::{SnapshotStore, StoreError};
