//! Fleet inventory wire models

pub mod models;

pub use models::*;
