//! In-memory store for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use switchyard_core::domain::inventory::{Device, Pool};
use switchyard_core::domain::job::JobDefinition;
use switchyard_core::domain::run::{ExecutionResult, Run, RunStatus};
use switchyard_core::domain::task::Task;
use switchyard_core::runtime::RuntimeToken;
use uuid::Uuid;

use super::{InventoryRepository, RunRepository, ServiceRepository, StoreError};

type RunKey = (String, RuntimeToken);

#[derive(Default)]
pub struct MemoryStore {
    devices: Mutex<Vec<Device>>,
    pools: Mutex<Vec<(Pool, Vec<Uuid>)>>,
    services: Mutex<HashMap<String, JobDefinition>>,
    tasks: Mutex<HashMap<Uuid, Task>>,
    runs: Mutex<HashMap<RunKey, Run>>,
    offline: AtomicBool,
    inventory_offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, name: &str, ip_address: &str) -> Device {
        let device = Device {
            id: Uuid::new_v4(),
            name: name.to_string(),
            ip_address: ip_address.to_string(),
        };
        self.devices.lock().unwrap().push(device.clone());
        device
    }

    pub fn add_pool(&self, name: &str, members: &[&Device]) -> Pool {
        let pool = Pool {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        let members = members.iter().map(|d| d.id).collect();
        self.pools.lock().unwrap().push((pool.clone(), members));
        pool
    }

    pub fn add_service(&self, job: JobDefinition) {
        self.services.lock().unwrap().insert(job.name.clone(), job);
    }

    pub fn add_task(&self, task: Task) {
        self.tasks.lock().unwrap().insert(task.id, task);
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn runs(&self) -> Vec<Run> {
        self.runs.lock().unwrap().values().cloned().collect()
    }

    /// Makes every subsequent call fail
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes device and pool lookups fail while runs stay writable
    pub fn set_inventory_offline(&self, offline: bool) {
        self.inventory_offline.store(offline, Ordering::SeqCst);
    }

    fn check_inventory(&self) -> Result<(), StoreError> {
        if self.inventory_offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("inventory is offline".to_string()));
        }
        self.check()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn with_run<F>(&self, service_name: &str, runtime: &RuntimeToken, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Run),
    {
        self.check()?;
        let mut runs = self.runs.lock().unwrap();
        if let Some(run) = runs.get_mut(&(service_name.to_string(), runtime.clone())) {
            f(run);
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, StoreError> {
        self.check_inventory()?;
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().find(|d| d.name == name).cloned())
    }

    async fn device_by_ip_address(&self, ip_address: &str) -> Result<Option<Device>, StoreError> {
        self.check_inventory()?;
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().find(|d| d.ip_address == ip_address).cloned())
    }

    async fn pool_by_name(&self, name: &str) -> Result<Option<Pool>, StoreError> {
        self.check_inventory()?;
        let pools = self.pools.lock().unwrap();
        Ok(pools.iter().find(|(p, _)| p.name == name).map(|(p, _)| p.clone()))
    }

    async fn devices_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError> {
        self.check_inventory()?;
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().filter(|d| ids.contains(&d.id)).cloned().collect())
    }

    async fn pool_devices(&self, pool_id: Uuid) -> Result<Vec<Device>, StoreError> {
        self.check_inventory()?;
        let members = {
            let pools = self.pools.lock().unwrap();
            pools
                .iter()
                .find(|(p, _)| p.id == pool_id)
                .map(|(_, members)| members.clone())
                .unwrap_or_default()
        };
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .iter()
            .filter(|d| members.contains(&d.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn service_by_name(&self, name: &str) -> Result<Option<JobDefinition>, StoreError> {
        self.check()?;
        Ok(self.services.lock().unwrap().get(name).cloned())
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.check()?;
        Ok(self.tasks.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl RunRepository for MemoryStore {
    async fn create_run(&self, run: &Run) -> Result<(), StoreError> {
        self.check()?;
        self.runs.lock().unwrap().insert(
            (run.service_name.clone(), run.runtime.clone()),
            run.clone(),
        );
        Ok(())
    }

    async fn update_status(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
        status: RunStatus,
    ) -> Result<(), StoreError> {
        self.with_run(service_name, runtime, |run| run.status = status)
    }

    async fn persist_result(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
        result: &ExecutionResult,
    ) -> Result<(), StoreError> {
        self.with_run(service_name, runtime, |run| {
            run.status = RunStatus::from_success(result.success);
            run.completed_at = Some(chrono::Utc::now());
            run.result = Some(result.clone());
        })
    }

    async fn find_run(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
    ) -> Result<Option<Run>, StoreError> {
        self.check()?;
        let runs = self.runs.lock().unwrap();
        Ok(runs
            .get(&(service_name.to_string(), runtime.clone()))
            .cloned())
    }
}
