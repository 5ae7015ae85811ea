//! Turns `zpool status` text into a structured pool topology and raw
//! SMART/NVMe/SCSI attributes into pass/fail signals.
//!
//! Everything here is a pure transformation of one snapshot: no processes
//! are spawned and nothing is persisted.

pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod thresholds;
pub mod util;
