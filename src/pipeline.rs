//! One compatibility or recommendation run over a fitted catalog.
//!
//! A [`TastePipeline`] owns its scale model and normalized matrix; nothing
//! is shared between pipelines.

use serde::Serialize;

use crate::catalog::{Catalog, FeatureMatrix};
use crate::cluster::{ClusterConfig, Clustering, cluster_with};
use crate::error::Result;
use crate::models::FeatureVector;
use crate::profile::{Profile, aggregate_profile};
use crate::recommend::{ScoredTrack, recommend, recommend_excluding};
use crate::scale::{DegeneratePolicy, ScaleModel};
use crate::similarity::Compatibility;

/// Profiles of two users and how well they match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub compatibility: Compatibility,
    pub profile_a: Profile,
    pub profile_b: Profile,
    /// Whether the profiles were standardized before comparison
    pub normalized: bool,
}

/// Compare two users' liked tracks on the raw feature values.
///
/// Needs no scale model, so it also works on catalogs with constant features.
pub fn raw_compatibility(
    catalog: &Catalog,
    liked_a: &[usize],
    liked_b: &[usize],
) -> Result<CompatibilityReport> {
    let profile_a = aggregate_profile(catalog.schema(), &catalog.select(liked_a)?)?;
    let profile_b = aggregate_profile(catalog.schema(), &catalog.select(liked_b)?)?;
    let compatibility = Compatibility::between(profile_a.vector(), profile_b.vector())?;
    Ok(report(compatibility, profile_a, profile_b, false))
}

fn report(
    compatibility: Compatibility,
    profile_a: Profile,
    profile_b: Profile,
    normalized: bool,
) -> CompatibilityReport {
    tracing::info!(
        score = compatibility.score,
        cosine = compatibility.cosine,
        normalized,
        "Compatibility computed"
    );
    CompatibilityReport {
        compatibility,
        profile_a,
        profile_b,
        normalized,
    }
}

pub struct TastePipeline<'a> {
    catalog: &'a Catalog,
    scale: ScaleModel,
    matrix: FeatureMatrix,
}

impl<'a> TastePipeline<'a> {
    /// Fit the scale model on `catalog` and normalize every row.
    pub fn fit(catalog: &'a Catalog, policy: DegeneratePolicy) -> Result<Self> {
        let scale = ScaleModel::fit_catalog(catalog, policy)?;
        let matrix = scale.transform_catalog(catalog)?;
        Ok(Self {
            catalog,
            scale,
            matrix,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    #[must_use]
    pub fn scale(&self) -> &ScaleModel {
        &self.scale
    }

    /// Normalized catalog matrix.
    #[must_use]
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Raw profile of the tracks at `liked`.
    pub fn profile(&self, liked: &[usize]) -> Result<Profile> {
        let tracks = self.catalog.select(liked)?;
        aggregate_profile(self.catalog.schema(), &tracks)
    }

    /// Profile of `liked`, standardized with this catalog's scale model.
    pub fn normalized_profile(&self, liked: &[usize]) -> Result<FeatureVector> {
        self.scale.transform(self.profile(liked)?.vector())
    }

    /// Compare two users' liked tracks in standardized space, so wide-range
    /// features such as tempo do not dominate.
    pub fn compatibility(
        &self,
        liked_a: &[usize],
        liked_b: &[usize],
    ) -> Result<CompatibilityReport> {
        let profile_a = self.profile(liked_a)?;
        let profile_b = self.profile(liked_b)?;
        let compatibility = Compatibility::between(
            &self.scale.transform(profile_a.vector())?,
            &self.scale.transform(profile_b.vector())?,
        )?;
        Ok(report(compatibility, profile_a, profile_b, true))
    }

    /// Top `n` catalog tracks for the taste of `liked`.
    ///
    /// With `exclude_liked` the liked tracks themselves are skipped.
    pub fn recommend(
        &self,
        liked: &[usize],
        n: usize,
        exclude_liked: bool,
    ) -> Result<Vec<ScoredTrack>> {
        let profile = self.normalized_profile(liked)?;
        if exclude_liked {
            recommend_excluding(&profile, self.catalog, &self.matrix, n, liked)
        } else {
            recommend(&profile, self.catalog, &self.matrix, n)
        }
    }

    /// Cluster the normalized catalog.
    pub fn cluster(&self, k: usize, seed: u64, config: &ClusterConfig) -> Result<Clustering> {
        cluster_with(&self.matrix, k, seed, config)
    }
}
