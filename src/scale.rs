//! Per-feature standardization fit on a catalog.
//!
//! Uses the population standard deviation (divide by `n`), matching the usual
//! standard-scaler convention.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, FeatureMatrix};
use crate::error::{Result, VibeError};
use crate::models::{FeatureSchema, FeatureVector};

/// Standard deviations at or below this are treated as zero.
const DEGENERATE_STD: f64 = 1e-12;

/// What to do with a feature whose value never varies across the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Refuse to fit with `DegenerateFeature`.
    #[default]
    Reject,
    /// Subtract the mean and keep a unit scale, so the feature becomes 0.
    Center,
}

/// Per-feature mean and standard deviation.
///
/// Immutable once fitted; sharing one across threads for `transform` is safe.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleModel {
    schema: FeatureSchema,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl ScaleModel {
    /// Fit means and standard deviations column by column.
    pub fn fit(matrix: &FeatureMatrix, policy: DegeneratePolicy) -> Result<Self> {
        if matrix.is_empty() {
            return Err(VibeError::EmptyInput);
        }
        #[allow(clippy::cast_precision_loss)]
        let n = matrix.len() as f64;
        let schema = matrix.schema().clone();
        let mut means = Vec::with_capacity(schema.len());
        let mut scales = Vec::with_capacity(schema.len());

        for (j, feature) in schema.names().iter().enumerate() {
            let mean = matrix.column(j).sum::<f64>() / n;
            let variance = matrix.column(j).map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            let scale = if std > DEGENERATE_STD {
                std
            } else {
                match policy {
                    DegeneratePolicy::Reject => {
                        return Err(VibeError::DegenerateFeature {
                            feature: feature.clone(),
                        });
                    }
                    DegeneratePolicy::Center => {
                        tracing::debug!(feature = %feature, "constant feature, centering only");
                        1.0
                    }
                }
            };
            means.push(mean);
            scales.push(scale);
        }

        tracing::info!(rows = matrix.len(), features = schema.len(), "Scale model fitted");
        Ok(Self {
            schema,
            means,
            scales,
        })
    }

    /// Fit on a catalog's raw feature matrix.
    pub fn fit_catalog(catalog: &Catalog, policy: DegeneratePolicy) -> Result<Self> {
        Self::fit(&catalog.matrix(), policy)
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Standard deviation used as divisor per feature.
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// `(v - mean) / std` elementwise.
    pub fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector> {
        self.schema.check(vector)?;
        Ok(vector
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }

    /// Transform every row. The matrix must use the schema this model was fit on.
    pub fn transform_matrix(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        if matrix.schema() != &self.schema {
            return Err(VibeError::SchemaMismatch(format!(
                "scale model fit on {:?}, matrix has {:?}",
                self.schema.names(),
                matrix.schema().names()
            )));
        }
        let rows = matrix
            .rows()
            .iter()
            .map(|row| self.transform(row))
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::new(self.schema.clone(), rows)
    }

    pub fn transform_catalog(&self, catalog: &Catalog) -> Result<FeatureMatrix> {
        self.transform_matrix(&catalog.matrix())
    }
}

/// Stateful wrapper for callers that fit and transform in separate steps.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    policy: DegeneratePolicy,
    model: Option<ScaleModel>,
}

impl Normalizer {
    #[must_use]
    pub fn new(policy: DegeneratePolicy) -> Self {
        Self {
            policy,
            model: None,
        }
    }

    /// Fit (or refit) on `matrix`. A failed fit leaves the previous model in place.
    pub fn fit(&mut self, matrix: &FeatureMatrix) -> Result<&ScaleModel> {
        let model = ScaleModel::fit(matrix, self.policy)?;
        Ok(&*self.model.insert(model))
    }

    #[must_use]
    pub fn model(&self) -> Option<&ScaleModel> {
        self.model.as_ref()
    }

    pub fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector> {
        self.model.as_ref().ok_or(VibeError::NotFitted)?.transform(vector)
    }

    pub fn transform_matrix(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.model
            .as_ref()
            .ok_or(VibeError::NotFitted)?
            .transform_matrix(matrix)
    }
}
