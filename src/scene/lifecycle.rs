use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::foundation::error::{RevealError, RevealResult};
use crate::scene::catalog::Catalog;
use crate::scene::dataset::{DatasetId, DatasetInfo, DatasetState, PointCloud};
use crate::scene::loader::{DatasetLoader, LoadCompletion, LoadRequest};

/// A load that finished since the previous [`DatasetRegistry::poll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready { id: DatasetId },
    Failed { id: DatasetId, uri: String, cause: String },
}

impl LoadOutcome {
    pub fn id(&self) -> &DatasetId {
        match self {
            Self::Ready { id } | Self::Failed { id, .. } => id,
        }
    }
}

/// Owns per-dataset load state and the decoded clouds.
pub struct DatasetRegistry {
    catalog: Catalog,
    loader: Box<dyn DatasetLoader>,
    states: HashMap<DatasetId, DatasetState>,
    clouds: HashMap<DatasetId, Arc<PointCloud>>,
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
}

impl std::fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("datasets", &self.catalog.len())
            .field("states", &self.states)
            .finish()
    }
}

impl DatasetRegistry {
    pub fn new(catalog: Catalog, loader: impl DatasetLoader + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            catalog,
            loader: Box::new(loader),
            states: HashMap::new(),
            clouds: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn info(&self, id: &str) -> RevealResult<&DatasetInfo> {
        self.catalog.get(id)
    }

    pub fn state(&self, id: &str) -> DatasetState {
        self.states.get(id).cloned().unwrap_or_default()
    }

    /// Start loading `id` unless it is already loading or ready. A failed dataset is retried.
    ///
    /// Returns the state after the call; synchronous loaders still only become `Ready` on the
    /// next [`DatasetRegistry::poll`].
    pub fn request_load(&mut self, id: &str) -> RevealResult<DatasetState> {
        let info = self.catalog.get(id)?;
        let id = info.id.clone();
        let uri = info.uri.clone();
        match self.state(id.as_str()) {
            DatasetState::Loading => return Ok(DatasetState::Loading),
            DatasetState::Ready => return Ok(DatasetState::Ready),
            DatasetState::Unloaded | DatasetState::Failed { .. } => {}
        }
        tracing::info!(dataset = %id, %uri, "loading dataset");
        self.states.insert(id.clone(), DatasetState::Loading);
        self.loader
            .load(LoadRequest { id, uri }, self.tx.clone());
        Ok(DatasetState::Loading)
    }

    /// Apply every completion that has arrived. Completions for datasets no longer loading are
    /// dropped.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut out = Vec::new();
        loop {
            let completion = match self.rx.try_recv() {
                Ok(c) => c,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            if self.state(completion.id.as_str()) != DatasetState::Loading {
                tracing::debug!(dataset = %completion.id, "stale load completion ignored");
                continue;
            }
            match completion.result {
                Ok(cloud) => {
                    tracing::info!(dataset = %completion.id, points = cloud.len(), "dataset ready");
                    self.clouds.insert(completion.id.clone(), cloud);
                    self.states.insert(completion.id.clone(), DatasetState::Ready);
                    out.push(LoadOutcome::Ready { id: completion.id });
                }
                Err(cause) => {
                    tracing::warn!(dataset = %completion.id, uri = %completion.uri, %cause, "dataset load failed");
                    self.states.insert(
                        completion.id.clone(),
                        DatasetState::Failed {
                            cause: cause.clone(),
                        },
                    );
                    out.push(LoadOutcome::Failed {
                        id: completion.id,
                        uri: completion.uri,
                        cause,
                    });
                }
            }
        }
        out
    }

    /// Decoded cloud of a ready dataset.
    pub fn cloud(&self, id: &str) -> RevealResult<Arc<PointCloud>> {
        if !self.catalog.contains(id) {
            return Err(RevealError::not_found(id));
        }
        self.clouds.get(id).cloned().ok_or_else(|| {
            RevealError::validation(format!("dataset '{id}' is not ready"))
        })
    }

    /// Drop a dataset's cloud and return it to `Unloaded`.
    pub fn evict(&mut self, id: &str) -> bool {
        self.states.remove(id);
        self.clouds.remove(id).is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/lifecycle.rs"]
mod tests;
