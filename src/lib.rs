//! Chorus - Version control for LLM prompts
//!
//! Chorus records every prompt an application sends together with the
//! inputs and output of the call, assigns each distinct prompt a semantic
//! version, and keeps the history in timestamped JSON snapshots.

pub mod config;
pub mod storage;
pub mod tracking;
pub mod versioning;
