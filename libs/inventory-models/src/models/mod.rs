//! Inventory models

use serde::{Deserialize, Serialize};

/// Full inventory export, as served by the source of truth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub devices: Vec<InventoryDevice>,
}

/// One device as described by the inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryDevice {
    pub hostname: String,

    /// Managed by the periodic configuration push
    #[serde(default)]
    pub afk_enabled: bool,

    #[serde(default)]
    pub interfaces: Vec<InventoryInterface>,

    #[serde(default)]
    pub vlans: Vec<InventoryVlan>,
}

/// Physical or logical interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryInterface {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub mtu: Option<u32>,

    /// Untagged VLAN, must be declared in the device's VLAN list
    #[serde(default)]
    pub access_vlan: Option<u32>,
}

/// VLAN declared on a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryVlan {
    pub id: u32,

    #[serde(default)]
    pub name: Option<String>,
}

fn default_true() -> bool {
    true
}
