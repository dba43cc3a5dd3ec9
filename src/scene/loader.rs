//! Dataset loading seam.
//!
//! Decoding formats are out of scope: a [`DatasetLoader`] turns a request into a
//! [`PointCloud`] however it likes and reports back through a channel. Completions may be sent
//! from any thread; the registry only applies them when the control thread polls.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::foundation::core::{Point, Rgb, Vec3};
use crate::foundation::math::position_hash;
use crate::scene::dataset::{DatasetId, PointCloud};

/// One load the registry wants performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: DatasetId,
    pub uri: String,
}

/// Result of one [`LoadRequest`], sent back over the completion channel.
#[derive(Clone, Debug)]
pub struct LoadCompletion {
    pub id: DatasetId,
    pub uri: String,
    pub result: Result<Arc<PointCloud>, String>,
}

pub type CompletionSender = Sender<LoadCompletion>;

pub trait DatasetLoader: Send {
    /// Start loading. Exactly one completion must eventually be sent for the request, unless the
    /// receiving side is gone.
    fn load(&mut self, request: LoadRequest, done: CompletionSender);
}

fn send(done: &CompletionSender, completion: LoadCompletion) {
    if done.send(completion).is_err() {
        tracing::debug!("load completion dropped, registry is gone");
    }
}

/// Deterministic procedural clouds, keyed by dataset id. Completes synchronously.
#[derive(Clone, Debug)]
pub struct SyntheticLoader {
    pub points_per_dataset: usize,
    pub radius: f32,
    /// Ids that fail to load, for exercising error paths.
    pub failing: Vec<DatasetId>,
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        Self {
            points_per_dataset: 2048,
            radius: 12.0,
            failing: Vec::new(),
        }
    }
}

impl SyntheticLoader {
    pub fn with_points(points_per_dataset: usize) -> Self {
        Self {
            points_per_dataset,
            ..Self::default()
        }
    }

    pub fn failing(mut self, id: impl Into<DatasetId>) -> Self {
        self.failing.push(id.into());
        self
    }

    /// Cloud filling a ball of `radius`, different per id but identical across calls.
    pub fn generate(&self, id: &DatasetId) -> PointCloud {
        let salt = xxhash_rust::xxh3::xxh3_64(id.as_str().as_bytes());
        let n = self.points_per_dataset;
        let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
        let points = (0..n)
            .map(|i| {
                // fibonacci sphere direction, hash-jittered radius
                let fi = i as f32 + 0.5;
                let y = 1.0 - 2.0 * fi / n.max(1) as f32;
                let ring = (1.0 - y * y).max(0.0).sqrt();
                let theta = golden * i as f32;
                let dir = Vec3::new(theta.cos() * ring, y, theta.sin() * ring);
                let r = position_hash(dir, salt).cbrt() * self.radius;
                let pos = dir * r;
                let tone = position_hash(pos, salt ^ 1);
                Point::new(
                    pos,
                    Rgb::new(0.4 + 0.6 * tone, 0.5, 1.0 - 0.6 * tone),
                    1.0,
                    0.02 + 0.03 * position_hash(pos, salt ^ 2),
                )
            })
            .collect();
        PointCloud::new(points)
    }
}

impl DatasetLoader for SyntheticLoader {
    fn load(&mut self, request: LoadRequest, done: CompletionSender) {
        let result = if self.failing.contains(&request.id) {
            Err(format!("synthetic failure for '{}'", request.id))
        } else {
            Ok(Arc::new(self.generate(&request.id)))
        };
        send(
            &done,
            LoadCompletion {
                id: request.id,
                uri: request.uri,
                result,
            },
        );
    }
}

/// Clouds registered up front by uri. Unknown uris fail. Completes synchronously.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    clouds: HashMap<String, Arc<PointCloud>>,
}

impl MemoryLoader {
    pub fn insert(&mut self, uri: impl Into<String>, cloud: PointCloud) {
        self.clouds.insert(uri.into(), Arc::new(cloud));
    }
}

impl DatasetLoader for MemoryLoader {
    fn load(&mut self, request: LoadRequest, done: CompletionSender) {
        let result = self
            .clouds
            .get(&request.uri)
            .cloned()
            .ok_or_else(|| format!("no data at '{}'", request.uri));
        send(
            &done,
            LoadCompletion {
                id: request.id,
                uri: request.uri,
                result,
            },
        );
    }
}

/// Runs an inner loader on a fresh worker thread per request.
#[derive(Clone, Debug)]
pub struct ThreadedLoader<L> {
    inner: L,
    latency: Duration,
}

impl<L> ThreadedLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            latency: Duration::ZERO,
        }
    }

    /// Sleep this long on the worker before loading.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl<L> DatasetLoader for ThreadedLoader<L>
where
    L: DatasetLoader + Clone + 'static,
{
    fn load(&mut self, request: LoadRequest, done: CompletionSender) {
        let mut inner = self.inner.clone();
        let latency = self.latency;
        let spawned = thread::Builder::new()
            .name(format!("load-{}", request.id))
            .spawn({
                let request = request.clone();
                let done = done.clone();
                move || {
                    if !latency.is_zero() {
                        thread::sleep(latency);
                    }
                    inner.load(request, done);
                }
            });
        if let Err(e) = spawned {
            send(
                &done,
                LoadCompletion {
                    id: request.id,
                    uri: request.uri,
                    result: Err(format!("failed to spawn loader thread: {e}")),
                },
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/loader.rs"]
mod tests;
