use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::scene::dataset::{DatasetId, PointCloud};

/// Opaque handle to a renderable instance owned by a [`RenderHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct InstanceHandle(pub u64);

/// Render-side owner of dataset instances.
///
/// The director only creates, toggles, orders and releases instances; drawing is the host's
/// business. New instances start disabled.
pub trait RenderHost {
    fn create_instance(
        &mut self,
        dataset: &DatasetId,
        cloud: &Arc<PointCloud>,
    ) -> Result<InstanceHandle, String>;

    fn set_enabled(&mut self, handle: InstanceHandle, enabled: bool);

    /// Higher orders draw on top.
    fn set_render_order(&mut self, handle: InstanceHandle, order: i32);

    fn release_instance(&mut self, handle: InstanceHandle);
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct HostInstance {
    pub dataset: DatasetId,
    pub enabled: bool,
    pub render_order: i32,
    pub points: usize,
}

/// Host that only records what it was told. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_handle: u64,
    instances: BTreeMap<InstanceHandle, HostInstance>,
    rejected: HashSet<DatasetId>,
}

impl HeadlessHost {
    /// Make instance creation fail for `dataset`.
    pub fn reject(&mut self, dataset: impl Into<DatasetId>) {
        self.rejected.insert(dataset.into());
    }

    pub fn instance(&self, handle: InstanceHandle) -> Option<&HostInstance> {
        self.instances.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    /// Datasets of all enabled instances, in handle order.
    pub fn enabled_datasets(&self) -> Vec<DatasetId> {
        self.instances
            .values()
            .filter(|i| i.enabled)
            .map(|i| i.dataset.clone())
            .collect()
    }
}

impl RenderHost for HeadlessHost {
    fn create_instance(
        &mut self,
        dataset: &DatasetId,
        cloud: &Arc<PointCloud>,
    ) -> Result<InstanceHandle, String> {
        if self.rejected.contains(dataset) {
            return Err(format!("host rejected dataset '{dataset}'"));
        }
        let handle = InstanceHandle(self.next_handle);
        self.next_handle += 1;
        self.instances.insert(
            handle,
            HostInstance {
                dataset: dataset.clone(),
                enabled: false,
                render_order: 0,
                points: cloud.len(),
            },
        );
        Ok(handle)
    }

    fn set_enabled(&mut self, handle: InstanceHandle, enabled: bool) {
        if let Some(i) = self.instances.get_mut(&handle) {
            i.enabled = enabled;
        }
    }

    fn set_render_order(&mut self, handle: InstanceHandle, order: i32) {
        if let Some(i) = self.instances.get_mut(&handle) {
            i.render_order = order;
        }
    }

    fn release_instance(&mut self, handle: InstanceHandle) {
        self.instances.remove(&handle);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/host.rs"]
mod tests;
