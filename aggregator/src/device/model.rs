//! Device models

use std::collections::btree_map::{self, BTreeMap};
use std::sync::Arc;

use serde_json::Value;

/// Computed configuration of one device
///
/// Built once by a conversion and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    hostname: String,
    afk_enabled: bool,
    config: Value,
}

impl Device {
    pub fn new(hostname: impl Into<String>, afk_enabled: bool, config: Value) -> Self {
        Self {
            hostname: hostname.into(),
            afk_enabled,
            config,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether the device is managed by the periodic configuration push
    pub fn afk_enabled(&self) -> bool {
        self.afk_enabled
    }

    /// OpenConfig tree
    pub fn config(&self) -> &Value {
        &self.config
    }
}

/// All devices produced by one build, keyed by hostname
///
/// Hostnames are case-sensitive. Iteration is ordered by hostname.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSet {
    devices: BTreeMap<String, Arc<Device>>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device, returning the one it replaced if the hostname was taken
    pub fn insert(&mut self, device: Device) -> Option<Arc<Device>> {
        self.devices.insert(device.hostname.clone(), Arc::new(device))
    }

    pub fn get(&self, hostname: &str) -> Option<&Arc<Device>> {
        self.devices.get(hostname)
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.devices.contains_key(hostname)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Arc<Device>> {
        self.devices.iter()
    }
}

impl FromIterator<Device> for DeviceSet {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        let mut set = DeviceSet::new();
        for device in iter {
            set.insert(device);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DeviceSet {
    type Item = (&'a String, &'a Arc<Device>);
    type IntoIter = btree_map::Iter<'a, String, Arc<Device>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
