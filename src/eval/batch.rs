use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use rayon::prelude::*;

use crate::eval::frame::{FrameSnapshot, PointOutput};
use crate::foundation::core::Point;
use crate::foundation::error::{RevealError, RevealResult};

/// Threading and chunking controls for whole-frame evaluation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvalThreading {
    /// Evaluate points in parallel when `true`.
    pub parallel: bool,
    /// Minimum number of points handed to one worker at a time.
    pub chunk_size: usize,
    /// Optional explicit worker thread count. `None` uses the global rayon pool; otherwise a
    /// dedicated pool is built the first time a count is seen and reused after that.
    pub threads: Option<usize>,
}

impl Default for EvalThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 4096,
            threads: None,
        }
    }
}

impl EvalThreading {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Aggregated per-frame counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameStats {
    pub points_total: u64,
    pub points_visible: u64,
    /// Mean alpha over visible points; 0 when none are visible.
    pub mean_alpha: f32,
    /// Mean size scale over visible points; 0 when none are visible.
    pub mean_size_scale: f32,
}

impl FrameStats {
    pub fn from_outputs(outputs: &[PointOutput]) -> Self {
        let mut visible = 0u64;
        let mut alpha = 0.0f64;
        let mut size = 0.0f64;
        for o in outputs.iter().filter(|o| o.visible) {
            visible += 1;
            alpha += f64::from(o.alpha);
            size += f64::from(o.size_scale);
        }
        let mean = |sum: f64| {
            if visible == 0 {
                0.0
            } else {
                (sum / visible as f64) as f32
            }
        };
        Self {
            points_total: outputs.len() as u64,
            points_visible: visible,
            mean_alpha: mean(alpha),
            mean_size_scale: mean(size),
        }
    }
}

/// Evaluate every point of a cloud against one snapshot. Output order matches input order.
#[tracing::instrument(skip(points, snapshot, threading), fields(points = points.len(), kind = %snapshot.kind))]
pub fn evaluate_frame(
    points: &[Point],
    snapshot: &FrameSnapshot,
    threading: &EvalThreading,
) -> RevealResult<Vec<PointOutput>> {
    if !threading.parallel || points.len() <= threading.chunk_size.max(1) {
        return Ok(points.iter().map(|p| snapshot.evaluate(p)).collect());
    }

    let snap = *snapshot;
    let min_len = threading.chunk_size.max(1);
    let run = || {
        points
            .par_iter()
            .with_min_len(min_len)
            .map(|p| snap.evaluate(p))
            .collect::<Vec<_>>()
    };

    match threading.threads {
        None => Ok(run()),
        Some(n) => Ok(thread_pool(n)?.install(run)),
    }
}

/// [`evaluate_frame`] plus its [`FrameStats`].
pub fn evaluate_frame_with_stats(
    points: &[Point],
    snapshot: &FrameSnapshot,
    threading: &EvalThreading,
) -> RevealResult<(Vec<PointOutput>, FrameStats)> {
    let outputs = evaluate_frame(points, snapshot, threading)?;
    let stats = FrameStats::from_outputs(&outputs);
    tracing::debug!(
        visible = stats.points_visible,
        total = stats.points_total,
        "frame evaluated"
    );
    Ok((outputs, stats))
}

static POOLS: OnceLock<Mutex<HashMap<usize, Arc<rayon::ThreadPool>>>> = OnceLock::new();

/// Shared pool with `threads` workers.
fn thread_pool(threads: usize) -> RevealResult<Arc<rayon::ThreadPool>> {
    if threads == 0 {
        return Err(RevealError::validation(
            "eval threading 'threads' must be >= 1 when set",
        ));
    }
    let mut pools = POOLS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(pool) = pools.get(&threads) {
        return Ok(Arc::clone(pool));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| RevealError::validation(format!("failed to build rayon thread pool: {e}")))?;
    tracing::debug!(threads, "eval thread pool built");
    let pool = Arc::new(pool);
    pools.insert(threads, Arc::clone(&pool));
    Ok(pool)
}

#[cfg(test)]
#[path = "../../tests/unit/eval/batch.rs"]
mod tests;
