//! Inventory to device configuration conversion
//!
//! A converter is all-or-nothing: it returns a configuration for every
//! device of the inventory, or an error naming the device and rule that
//! failed.

pub mod openconfig;

use inventory_models::Inventory;
use thiserror::Error;

use crate::device::model::DeviceSet;

/// Why a conversion was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("device {hostname}: {reason}")]
    InvalidDevice { hostname: String, reason: String },

    #[error("duplicate hostname {0}")]
    DuplicateHostname(String),

    #[error("device without hostname at position {0}")]
    MissingHostname(usize),
}

impl ConversionError {
    pub(crate) fn device(hostname: &str, reason: impl Into<String>) -> Self {
        ConversionError::InvalidDevice {
            hostname: hostname.to_string(),
            reason: reason.into(),
        }
    }
}

/// Builds the full device set from an inventory snapshot
///
/// Implementations must not keep state between calls.
pub trait ConfigConverter: Send + Sync {
    fn convert(&self, inventory: &Inventory) -> Result<DeviceSet, ConversionError>;
}
