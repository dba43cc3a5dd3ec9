use crate::foundation::error::{RevealError, RevealResult};
use crate::scene::dataset::{DatasetId, DatasetInfo};

const BUILTIN_ROOT: &str = "assets/splats";

/// `(id, name, filename)` of the datasets that ship with the application.
const BUILTIN: &[(&str, &str, &str)] = &[
    ("bull_06_771ks_sel", "Bull 06 Selection", "Bull_06_771ks_Sel.ply"),
    ("bull2", "Bull 2", "Bull2.ply"),
    ("canyon", "Canyon", "Canyon.ply"),
    ("chair2", "Chair 2", "chair2.ply"),
    ("cluster_fly_xxl", "Cluster Fly XXL", "cluster fly XXL.ply"),
    ("future", "Future", "Future.ply"),
    (
        "gothic_church_kefermarkt",
        "Gothic Church Kefermarkt",
        "gothic-church-kefermarkt.ply",
    ),
    ("room", "Room", "Room.ply"),
    ("skull", "Skull", "skull.sog"),
    ("stonehenge", "Stonehenge", "stonehenge.ply"),
];

/// Where a [`Catalog`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Listing,
    Builtin,
}

/// Ordered list of known datasets.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Catalog {
    entries: Vec<DatasetInfo>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ListingDoc {
    Wrapped { scenes: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

#[derive(serde::Deserialize)]
struct ListingEntry {
    id: String,
    name: String,
    #[serde(alias = "url")]
    uri: String,
    #[serde(default)]
    filename: String,
}

impl Catalog {
    pub fn new(entries: Vec<DatasetInfo>) -> RevealResult<Self> {
        if entries.is_empty() {
            return Err(RevealError::validation("catalog must contain at least one dataset"));
        }
        for (i, e) in entries.iter().enumerate() {
            if entries[..i].iter().any(|prev| prev.id == e.id) {
                return Err(RevealError::validation(format!(
                    "catalog contains duplicate dataset id '{}'",
                    e.id
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The datasets that ship with the application.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(id, name, file)| DatasetInfo {
                    id: DatasetId::from(*id),
                    name: (*name).to_owned(),
                    uri: format!("{BUILTIN_ROOT}/{file}"),
                    filename: (*file).to_owned(),
                })
                .collect(),
        }
    }

    /// Strict parse of a listing document: either `{"scenes": [...]}` or a bare array.
    ///
    /// Entries without `id`, `name` and `url`/`uri` are skipped, as are repeated ids. Fails when
    /// the document is not JSON or nothing usable remains.
    pub fn parse_listing(json: &str) -> RevealResult<Self> {
        let doc: ListingDoc = serde_json::from_str(json)
            .map_err(|e| RevealError::serde(format!("invalid scene listing: {e}")))?;
        let raw = match doc {
            ListingDoc::Wrapped { scenes } => scenes,
            ListingDoc::Bare(list) => list,
        };

        let mut entries: Vec<DatasetInfo> = Vec::with_capacity(raw.len());
        for value in raw {
            let Ok(e) = serde_json::from_value::<ListingEntry>(value) else {
                continue;
            };
            if e.id.is_empty() || e.name.is_empty() || e.uri.is_empty() {
                continue;
            }
            if entries.iter().any(|prev| prev.id.as_str() == e.id) {
                continue;
            }
            let filename = if e.filename.is_empty() {
                e.uri.rsplit('/').next().unwrap_or_default().to_owned()
            } else {
                e.filename
            };
            entries.push(DatasetInfo {
                id: DatasetId::new(e.id),
                name: e.name,
                uri: e.uri,
                filename,
            });
        }
        Self::new(entries)
    }

    /// Parse a listing, falling back to [`Catalog::builtin`] on any problem.
    pub fn from_listing_or_builtin(json: &str) -> (Self, CatalogSource) {
        match Self::parse_listing(json) {
            Ok(catalog) => {
                tracing::debug!(datasets = catalog.len(), "scene listing parsed");
                (catalog, CatalogSource::Listing)
            }
            Err(err) => {
                tracing::warn!(%err, "scene listing unusable, using built-in datasets");
                (Self::builtin(), CatalogSource::Builtin)
            }
        }
    }

    pub fn entries(&self) -> &[DatasetInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&DatasetInfo> {
        self.entries.first()
    }

    pub fn get(&self, id: &str) -> RevealResult<&DatasetInfo> {
        self.entries
            .iter()
            .find(|e| e.id.as_str() == id)
            .ok_or_else(|| RevealError::not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id.as_str() == id)
    }

    /// Dataset after `id` in catalog order, wrapping. Unknown ids start from the first entry.
    pub fn next_after(&self, id: &str) -> Option<&DatasetInfo> {
        let idx = self.entries.iter().position(|e| e.id.as_str() == id);
        match idx {
            Some(i) => self.entries.get((i + 1) % self.entries.len()),
            None => self.entries.first(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/catalog.rs"]
mod tests;
