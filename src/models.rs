use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VibeError};

/// Audio attributes used when no schema is configured.
pub const DEFAULT_FEATURES: &[&str] = &[
    "danceability",
    "energy",
    "valence",
    "acousticness",
    "instrumentalness",
    "tempo",
];

/// Ordered list of feature names. Index `i` of every [`FeatureVector`]
/// computed against this schema holds the value of `names()[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty lists, blank names and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(VibeError::InvalidSchema("no features".to_string()));
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(VibeError::InvalidSchema("blank feature name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(VibeError::InvalidSchema(format!("duplicate feature {name:?}")));
            }
        }
        Ok(Self { names })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, feature: &str) -> Option<usize> {
        self.names.iter().position(|n| n == feature)
    }

    /// Keep only the features `keep` accepts, preserving order.
    ///
    /// Fails with `InvalidSchema` when nothing is left.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> Result<Self> {
        Self::new(self.names.iter().filter(|n| keep(n.as_str())).cloned())
    }

    /// Fail unless `vector` has one value per feature.
    pub fn check(&self, vector: &FeatureVector) -> Result<()> {
        if vector.len() == self.len() {
            Ok(())
        } else {
            Err(VibeError::dimension(self.len(), vector.len()))
        }
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            names: DEFAULT_FEATURES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = VibeError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}

/// Numeric representation of one track or one profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// True when every component is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One catalog entry. Display metadata is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub features: FeatureVector,
}

impl Track {
    /// "Artist - Name", falling back to the id when both are blank.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.artist.is_empty(), self.name.is_empty()) {
            (true, true) => self.id.clone(),
            (true, false) => self.name.clone(),
            (false, true) => self.artist.clone(),
            (false, false) => format!("{} - {}", self.artist, self.name),
        }
    }
}
