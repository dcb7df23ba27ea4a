use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, VibeError};
use crate::models::{FeatureSchema, FeatureVector, Track};

/// One raw catalog row as supplied by a collaborator.
///
/// Feature columns live in `fields` and are only interpreted once a schema
/// is applied. Accepts both the short names and the Kaggle Spotify dataset
/// column names for display metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(default, alias = "track_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "track_name", alias = "title")]
    pub name: String,
    #[serde(default, alias = "artists")]
    pub artist: String,
    #[serde(default, alias = "track_genre")]
    pub genre: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl TrackRecord {
    fn display_key(&self, row: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None if !self.name.is_empty() => self.name.clone(),
            None => format!("#{row}"),
        }
    }
}

fn track_id(artist: &str, name: &str) -> String {
    let key = format!("{}||{}", artist.to_lowercase().trim(), name.to_lowercase().trim());
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(&hash[..8])
}

/// Rows of feature vectors sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    schema: FeatureSchema,
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    /// Fails with `SchemaMismatch` when any row length differs from the schema.
    pub fn new(schema: FeatureSchema, rows: Vec<FeatureVector>) -> Result<Self> {
        for row in &rows {
            schema.check(row)?;
        }
        Ok(Self { schema, rows })
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of feature `feature` down every row.
    pub fn column(&self, feature: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(move |r| r.get(feature))
    }
}

/// Ordered, non-empty set of tracks over one feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    schema: FeatureSchema,
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(schema: FeatureSchema, tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(VibeError::EmptyInput);
        }
        for track in &tracks {
            schema.check(&track.features)?;
        }
        Ok(Self { schema, tracks })
    }

    /// Pull the schema's features out of raw records, in schema order.
    ///
    /// A record lacking a numeric value for any schema feature is a
    /// `SchemaMismatch`; nothing is zero-filled.
    pub fn from_records(schema: FeatureSchema, records: Vec<TrackRecord>) -> Result<Self> {
        let mut tracks = Vec::with_capacity(records.len());
        for (row, record) in records.into_iter().enumerate() {
            let features = schema
                .names()
                .iter()
                .map(|feature| {
                    record
                        .fields
                        .get(feature)
                        .and_then(numeric)
                        .ok_or_else(|| {
                            VibeError::missing_feature(&record.display_key(row), feature)
                        })
                })
                .collect::<Result<FeatureVector>>()?;
            let id = record
                .id
                .unwrap_or_else(|| track_id(&record.artist, &record.name));
            tracks.push(Track {
                id,
                name: record.name,
                artist: record.artist,
                genre: record.genre,
                features,
            });
        }
        Self::new(schema, tracks)
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Raw (unscaled) feature matrix, one row per track.
    #[must_use]
    pub fn matrix(&self) -> FeatureMatrix {
        FeatureMatrix {
            schema: self.schema.clone(),
            rows: self.tracks.iter().map(|t| t.features.clone()).collect(),
        }
    }

    /// Look a track up by id, else by catalog index when the key is numeric.
    pub fn resolve(&self, key: &str) -> Result<usize> {
        let key = key.trim();
        if let Some(index) = self.tracks.iter().position(|t| t.id == key) {
            return Ok(index);
        }
        match key.parse::<usize>() {
            Ok(index) if index < self.tracks.len() => Ok(index),
            Ok(index) => Err(VibeError::UnknownTrack(format!(
                "no track with id {key:?}, and index {index} out of range for {} tracks",
                self.tracks.len()
            ))),
            Err(_) => Err(VibeError::UnknownTrack(key.to_string())),
        }
    }

    /// Resolve every key, keeping caller order.
    pub fn resolve_all<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<usize>> {
        keys.iter().map(|k| self.resolve(k.as_ref())).collect()
    }

    /// Tracks at `indices`, in the order given.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<&Track>> {
        indices
            .iter()
            .map(|&i| {
                self.tracks.get(i).ok_or_else(|| {
                    VibeError::UnknownTrack(format!(
                        "index {i} out of range for {} tracks",
                        self.tracks.len()
                    ))
                })
            })
            .collect()
    }
}

/// Numbers, or strings holding one (CSV cells arrive as text).
fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

/// Schema features that no record carries at all.
#[must_use]
pub fn absent_features(schema: &FeatureSchema, records: &[TrackRecord]) -> Vec<String> {
    schema
        .names()
        .iter()
        .filter(|feature| !records.iter().any(|r| r.fields.contains_key(feature.as_str())))
        .cloned()
        .collect()
}

/// Read CSV rows with a header line, such as the Kaggle Spotify export.
///
/// Cells stay text; feature columns are parsed when a schema is applied.
fn read_csv_records(path: &Path) -> anyhow::Result<Vec<TrackRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open catalog {}", path.display()))?;
    reader
        .deserialize::<BTreeMap<String, String>>()
        .enumerate()
        .map(|(n, row)| {
            let row =
                row.with_context(|| format!("{}: invalid CSV row {}", path.display(), n + 1))?;
            let object = row
                .into_iter()
                .filter(|(column, _)| !column.trim().is_empty())
                .map(|(column, cell)| (column, serde_json::Value::String(cell)))
                .collect();
            serde_json::from_value(serde_json::Value::Object(object)).with_context(|| {
                format!("{}: invalid track record in row {}", path.display(), n + 1)
            })
        })
        .collect()
}

/// Read records from a JSON array, NDJSON for `.jsonl` / `.ndjson` files,
/// or CSV for `.csv` files.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<TrackRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if extension == "csv" {
        return read_csv_records(path);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;

    if matches!(extension.as_str(), "jsonl" | "ndjson") {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: invalid track record", path.display(), n + 1))
            })
            .collect()
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("{}: expected a JSON array of track records", path.display()))
    }
}

/// Load a catalog file against `schema`.
///
/// With `drop_absent` set, schema features that no record carries are
/// dropped (the dataset simply lacks that column) before extraction.
pub fn load_catalog(
    path: &Path,
    schema: &FeatureSchema,
    drop_absent: bool,
) -> anyhow::Result<Catalog> {
    let records = read_records(path)?;
    if records.is_empty() {
        bail!("{} contains no tracks", path.display());
    }

    let absent = absent_features(schema, &records);
    let schema = if absent.is_empty() || !drop_absent {
        schema.clone()
    } else {
        tracing::warn!(features = ?absent, "dropping features absent from the catalog");
        schema
            .retain(|f| !absent.iter().any(|a| a == f))
            .context("no configured feature is present in the catalog")?
    };

    let catalog = Catalog::from_records(schema, records)
        .with_context(|| format!("failed to build catalog from {}", path.display()))?;
    tracing::info!(
        tracks = catalog.len(),
        features = ?catalog.schema().names(),
        "Catalog loaded"
    );
    Ok(catalog)
}
