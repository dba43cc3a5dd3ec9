use std::borrow::Borrow;
use std::fmt;

use crate::foundation::core::{Point, Vec3};

/// Stable identifier of a dataset in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DatasetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for DatasetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Catalog entry describing where a dataset lives.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DatasetInfo {
    pub id: DatasetId,
    /// Human-readable name.
    pub name: String,
    pub uri: String,
    pub filename: String,
}

/// Load lifecycle of one dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DatasetState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed {
        cause: String,
    },
}

impl DatasetState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Decoded points of a dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point>,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty cloud.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.points.first()?.position;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.position), hi.max(p.position))
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/dataset.rs"]
mod tests;
