//! Storage layer for Chorus

pub mod export;
pub mod models;
pub mod project;
pub mod snapshot;
pub mod store;

pub use export::ExportDocument;
pub use models::*;
pub use store::{RecordStore, LEGACY_SNAPSHOT_FILE};
