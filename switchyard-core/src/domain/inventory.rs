//! Inventory domain types
//!
//! Devices and pools are owned by the inventory store. The dispatcher only
//! reads them to resolve target specifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A managed network device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub ip_address: String,
}

/// A named group of devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: Uuid,
    pub name: String,
}
