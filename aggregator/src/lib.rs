//! Data Aggregation API Library
//!
//! Builds per-device OpenConfig trees from a network inventory on a fixed
//! interval and serves the last successful build over HTTP.

pub mod app;
pub mod convert;
pub mod device;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod metrics;
pub mod report;
pub mod server;
pub mod source;
pub mod storage;
pub mod utils;
pub mod workers;
