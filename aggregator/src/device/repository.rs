//! Published device set

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::device::model::{Device, DeviceSet};
use crate::errors::AggregatorError;

/// Holds the device set published by the last successful build
///
/// Writers swap the whole set in one atomic store. Readers load the current
/// set and work on that snapshot; neither side ever waits on the other.
pub struct DeviceRepository {
    current: ArcSwap<DeviceSet>,
}

impl DeviceRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(DeviceSet::new()),
        }
    }

    /// Replace the published set
    pub fn set(&self, devices: DeviceSet) {
        self.current.store(Arc::new(devices));
    }

    /// Current set, consistent for as long as the caller holds it
    pub fn snapshot(&self) -> Arc<DeviceSet> {
        self.current.load_full()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_device(&self, hostname: &str) -> Result<Arc<Device>, AggregatorError> {
        self.current
            .load()
            .get(hostname)
            .cloned()
            .ok_or_else(|| AggregatorError::NotFound(hostname.to_string()))
    }

    pub fn is_afk_enabled(&self, hostname: &str) -> Result<bool, AggregatorError> {
        self.get_device(hostname).map(|d| d.afk_enabled())
    }

    /// AFK enabled devices, ordered by hostname
    pub fn list_afk_enabled(&self) -> Vec<(String, Arc<Device>)> {
        let devices = self.current.load();
        devices
            .iter()
            .filter(|(_, d)| d.afk_enabled())
            .map(|(hostname, d)| (hostname.clone(), Arc::clone(d)))
            .collect()
    }

    pub fn get_config(&self, hostname: &str) -> Result<Value, AggregatorError> {
        self.get_device(hostname).map(|d| d.config().clone())
    }

    pub fn get_all_configs(&self) -> BTreeMap<String, Value> {
        let devices = self.current.load();
        devices
            .iter()
            .map(|(hostname, d)| (hostname.clone(), d.config().clone()))
            .collect()
    }
}

impl Default for DeviceRepository {
    fn default() -> Self {
        Self::new()
    }
}
