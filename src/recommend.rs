use std::cmp::Ordering;

use serde::Serialize;

use crate::catalog::{Catalog, FeatureMatrix};
use crate::error::{Result, VibeError};
use crate::models::{FeatureVector, Track};
use crate::similarity::cosine;

/// One ranked catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTrack {
    /// Position in the catalog
    pub index: usize,
    pub similarity: f64,
    pub track: Track,
}

impl ScoredTrack {
    /// Format as TSV line: similarity, artist, name, genre, id.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!(
            "{:.4}\t{}\t{}\t{}\t{}",
            self.similarity, self.track.artist, self.track.name, self.track.genre, self.track.id,
        )
    }
}

/// Rank every catalog row by cosine similarity to `profile`, keep the top `n`.
///
/// `matrix` is the normalized form of `catalog` (same row order) and
/// `profile` must be normalized with the same scale model. Ties keep
/// catalog order. Nothing is filtered out, including the tracks the profile
/// was built from; see [`recommend_excluding`].
pub fn recommend(
    profile: &FeatureVector,
    catalog: &Catalog,
    matrix: &FeatureMatrix,
    n: usize,
) -> Result<Vec<ScoredTrack>> {
    recommend_excluding(profile, catalog, matrix, n, &[])
}

/// Like [`recommend`], skipping the catalog indices in `exclude`.
pub fn recommend_excluding(
    profile: &FeatureVector,
    catalog: &Catalog,
    matrix: &FeatureMatrix,
    n: usize,
    exclude: &[usize],
) -> Result<Vec<ScoredTrack>> {
    if n == 0 {
        return Err(VibeError::InvalidRequestSize(n));
    }
    if matrix.len() != catalog.len() {
        return Err(VibeError::SchemaMismatch(format!(
            "matrix has {} rows, catalog has {} tracks",
            matrix.len(),
            catalog.len()
        )));
    }
    matrix.schema().check(profile)?;

    let mut scored: Vec<(usize, f64)> = matrix
        .rows()
        .iter()
        .enumerate()
        .filter(|(i, _)| !exclude.contains(i))
        .map(|(i, row)| (i, cosine(profile.as_slice(), row.as_slice())))
        .collect();

    // sort_by is stable, so equal scores stay in catalog order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(n);

    tracing::debug!(
        candidates = matrix.len() - exclude.len().min(matrix.len()),
        returned = scored.len(),
        "ranked catalog"
    );

    Ok(scored
        .into_iter()
        .map(|(index, similarity)| ScoredTrack {
            index,
            similarity,
            track: catalog.tracks()[index].clone(),
        })
        .collect())
}
