//! Taste profile aggregation.

use serde::Serialize;

use crate::error::{Result, VibeError};
use crate::models::{FeatureSchema, FeatureVector, Track};

/// Mean feature vector of a set of liked tracks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    vector: FeatureVector,
    track_count: usize,
}

impl Profile {
    #[must_use]
    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }

    /// Number of tracks averaged into this profile.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// Value of one named feature.
    #[must_use]
    pub fn feature(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.index_of(name).and_then(|i| self.vector.get(i))
    }

    /// `(feature, value)` pairs in schema order.
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = (&'a str, f64)> {
        schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.vector.iter())
    }
}

/// Average raw feature vectors into a profile.
///
/// Each column is summed in sorted order, so the result is bit-identical
/// however the inputs are ordered.
pub fn aggregate_vectors<'a, I>(schema: &FeatureSchema, vectors: I) -> Result<Profile>
where
    I: IntoIterator<Item = &'a FeatureVector>,
{
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); schema.len()];
    let mut track_count = 0usize;

    for vector in vectors {
        schema.check(vector)?;
        for (column, value) in columns.iter_mut().zip(vector.iter()) {
            column.push(value);
        }
        track_count += 1;
    }

    if track_count == 0 {
        return Err(VibeError::EmptyInput);
    }

    #[allow(clippy::cast_precision_loss)]
    let n = track_count as f64;
    let vector = columns
        .iter_mut()
        .map(|column| {
            column.sort_by(f64::total_cmp);
            column.iter().sum::<f64>() / n
        })
        .collect();

    Ok(Profile {
        vector,
        track_count,
    })
}

/// Average the feature vectors of `tracks` into a profile.
pub fn aggregate_profile(schema: &FeatureSchema, tracks: &[&Track]) -> Result<Profile> {
    aggregate_vectors(schema, tracks.iter().map(|t| &t.features))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(values: &[f64]) -> Track {
        Track {
            id: String::new(),
            name: String::new(),
            artist: String::new(),
            genre: String::new(),
            features: FeatureVector::new(values.to_vec()),
        }
    }

    #[test]
    fn test_mean_of_single_feature() {
        let schema = FeatureSchema::new(["energy"]).unwrap();
        let a = track(&[0.8]);
        let b = track(&[0.6]);
        let profile = aggregate_profile(&schema, &[&a, &b]).unwrap();
        assert!((profile.feature(&schema, "energy").unwrap() - 0.7).abs() < 1e-12);
        assert_eq!(profile.track_count(), 2);
    }

    #[test]
    fn test_empty_input() {
        let schema = FeatureSchema::new(["energy"]).unwrap();
        assert_eq!(
            aggregate_profile(&schema, &[]).unwrap_err(),
            VibeError::EmptyInput
        );
    }

    #[test]
    fn test_length_mismatch() {
        let schema = FeatureSchema::new(["energy", "valence"]).unwrap();
        let a = track(&[0.8, 0.1]);
        let b = track(&[0.6]);
        assert!(matches!(
            aggregate_profile(&schema, &[&a, &b]),
            Err(VibeError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_order_independent() {
        let schema = FeatureSchema::new(["x", "y", "z"]).unwrap();
        let vectors = [
            FeatureVector::new(vec![0.1, 1e16, 0.3]),
            FeatureVector::new(vec![0.2, 1.0, -0.7]),
            FeatureVector::new(vec![0.7, -1e16, 0.11]),
            FeatureVector::new(vec![0.3, 3.0, 0.5]),
        ];
        let forward = aggregate_vectors(&schema, vectors.iter()).unwrap();
        let backward = aggregate_vectors(&schema, vectors.iter().rev()).unwrap();
        let shuffled =
            aggregate_vectors(&schema, [&vectors[2], &vectors[0], &vectors[3], &vectors[1]])
                .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_named_follows_schema() {
        let schema = FeatureSchema::new(["energy", "valence"]).unwrap();
        let a = track(&[1.0, 0.0]);
        let profile = aggregate_profile(&schema, &[&a]).unwrap();
        let named: Vec<_> = profile.named(&schema).collect();
        assert_eq!(named, vec![("energy", 1.0), ("valence", 0.0)]);
    }
}
