//! Target Resolver
//!
//! Turns raw target specifiers (device names, IP addresses, pool names) into
//! deduplicated device and pool identifiers. Every specifier occurrence
//! either resolves or yields exactly one error, so a repeated unknown name
//! is reported once per occurrence; resolution never stops at the first miss.

use switchyard_core::dto::run::TargetSpec;
use uuid::Uuid;

use crate::repository::{InventoryRepository, StoreError};

/// Outcome of target resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    pub devices: Vec<Uuid>,
    pub pools: Vec<Uuid>,

    /// One message per unresolved specifier, in input order
    pub errors: Vec<String>,
}

impl TargetSet {
    pub fn is_resolved(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolves every specifier in `requested`
///
/// Errors are grouped by category: device names, then IP addresses, then
/// pools. A store failure aborts resolution and is returned as `Err`; it is
/// not a resolution error.
pub async fn resolve(
    inventory: &dyn InventoryRepository,
    requested: &TargetSpec,
) -> Result<TargetSet, StoreError> {
    let mut targets = TargetSet::default();

    for name in &requested.devices {
        match inventory.device_by_name(name).await? {
            Some(device) => push_unique(&mut targets.devices, device.id),
            None => targets
                .errors
                .push(format!("No device with the name '{}'", name)),
        }
    }

    for ip_address in &requested.ip_addresses {
        match inventory.device_by_ip_address(ip_address).await? {
            Some(device) => push_unique(&mut targets.devices, device.id),
            None => targets
                .errors
                .push(format!("No device with the IP address '{}'", ip_address)),
        }
    }

    for name in &requested.pools {
        match inventory.pool_by_name(name).await? {
            Some(pool) => push_unique(&mut targets.pools, pool.id),
            None => targets
                .errors
                .push(format!("No pool with the name '{}'", name)),
        }
    }

    if !targets.is_resolved() {
        tracing::debug!("Target resolution failed: {:?}", targets.errors);
    }

    Ok(targets)
}

fn push_unique(ids: &mut Vec<Uuid>, id: Uuid) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
