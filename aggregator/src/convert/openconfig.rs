//! Inventory to OpenConfig rules

use std::collections::BTreeMap;

use inventory_models::{Inventory, InventoryDevice, InventoryInterface, InventoryVlan};
use serde_json::{json, Map, Value};

use crate::convert::{ConfigConverter, ConversionError};
use crate::device::model::{Device, DeviceSet};

pub const VLAN_ID_RANGE: std::ops::RangeInclusive<u32> = 1..=4094;
pub const MTU_RANGE: std::ops::RangeInclusive<u32> = 68..=9216;

const DEFAULT_INSTANCE: &str = "default";

/// Converts inventory devices into OpenConfig JSON trees
#[derive(Debug, Clone, Default)]
pub struct OpenConfigConverter;

impl OpenConfigConverter {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigConverter for OpenConfigConverter {
    fn convert(&self, inventory: &Inventory) -> Result<DeviceSet, ConversionError> {
        let mut devices = DeviceSet::new();

        for (position, source) in inventory.devices.iter().enumerate() {
            if source.hostname.trim().is_empty() {
                return Err(ConversionError::MissingHostname(position));
            }
            if devices.contains(&source.hostname) {
                return Err(ConversionError::DuplicateHostname(source.hostname.clone()));
            }

            let config = device_tree(source)?;
            devices.insert(Device::new(source.hostname.clone(), source.afk_enabled, config));
        }

        Ok(devices)
    }
}

fn device_tree(device: &InventoryDevice) -> Result<Value, ConversionError> {
    let vlans = validate_vlans(device)?;
    let interfaces = validate_interfaces(device, &vlans)?;

    Ok(json!({
        "openconfig-system:system": {
            "config": { "hostname": device.hostname }
        },
        "openconfig-interfaces:interfaces": {
            "interface": interfaces.values().map(|i| interface_tree(i)).collect::<Vec<_>>()
        },
        "openconfig-network-instance:network-instances": {
            "network-instance": [{
                "name": DEFAULT_INSTANCE,
                "config": {
                    "name": DEFAULT_INSTANCE,
                    "type": "openconfig-network-instance-types:DEFAULT_INSTANCE"
                },
                "vlans": {
                    "vlan": vlans.values().map(|v| vlan_tree(v)).collect::<Vec<_>>()
                }
            }]
        }
    }))
}

fn validate_vlans(
    device: &InventoryDevice,
) -> Result<BTreeMap<u32, &InventoryVlan>, ConversionError> {
    let mut vlans = BTreeMap::new();
    for vlan in &device.vlans {
        if !VLAN_ID_RANGE.contains(&vlan.id) {
            return Err(ConversionError::device(
                &device.hostname,
                format!("invalid VLAN {}", vlan.id),
            ));
        }
        if vlans.insert(vlan.id, vlan).is_some() {
            return Err(ConversionError::device(
                &device.hostname,
                format!("duplicate VLAN {}", vlan.id),
            ));
        }
    }
    Ok(vlans)
}

fn validate_interfaces<'a>(
    device: &'a InventoryDevice,
    vlans: &BTreeMap<u32, &InventoryVlan>,
) -> Result<BTreeMap<&'a str, &'a InventoryInterface>, ConversionError> {
    let mut interfaces = BTreeMap::new();

    for interface in &device.interfaces {
        if interface.name.is_empty() {
            return Err(ConversionError::device(&device.hostname, "interface without name"));
        }
        if let Some(mtu) = interface.mtu {
            if !MTU_RANGE.contains(&mtu) {
                return Err(ConversionError::device(
                    &device.hostname,
                    format!("interface {}: invalid MTU {}", interface.name, mtu),
                ));
            }
        }
        if let Some(vlan) = interface.access_vlan {
            if !vlans.contains_key(&vlan) {
                return Err(ConversionError::device(
                    &device.hostname,
                    format!("interface {}: undeclared VLAN {}", interface.name, vlan),
                ));
            }
        }
        if interfaces.insert(interface.name.as_str(), interface).is_some() {
            return Err(ConversionError::device(
                &device.hostname,
                format!("duplicate interface {}", interface.name),
            ));
        }
    }

    Ok(interfaces)
}

fn interface_tree(interface: &InventoryInterface) -> Value {
    let mut config = Map::new();
    config.insert("name".to_string(), json!(interface.name));
    config.insert("enabled".to_string(), json!(interface.enabled));
    if let Some(description) = &interface.description {
        config.insert("description".to_string(), json!(description));
    }
    if let Some(mtu) = interface.mtu {
        config.insert("mtu".to_string(), json!(mtu));
    }

    let mut tree = json!({
        "name": interface.name,
        "config": config,
    });

    if let Some(vlan) = interface.access_vlan {
        tree["openconfig-if-ethernet:ethernet"] = json!({
            "openconfig-vlan:switched-vlan": {
                "config": {
                    "interface-mode": "ACCESS",
                    "access-vlan": vlan
                }
            }
        });
    }

    tree
}

fn vlan_tree(vlan: &InventoryVlan) -> Value {
    let name = vlan
        .name
        .clone()
        .unwrap_or_else(|| format!("VLAN{:04}", vlan.id));

    json!({
        "vlan-id": vlan.id,
        "config": {
            "vlan-id": vlan.id,
            "name": name,
            "status": "ACTIVE"
        }
    })
}
