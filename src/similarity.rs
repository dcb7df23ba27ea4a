//! Cosine similarity and the 0-100 compatibility scale.

use serde::Serialize;

use crate::error::{Result, VibeError};
use crate::models::FeatureVector;

/// Scores above this are a great match.
pub const GREAT_MATCH: f64 = 70.0;
/// Scores above this share some taste.
pub const SOME_OVERLAP: f64 = 50.0;

/// Dot product of two equal-length slices.
#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean length.
#[must_use]
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine of the angle between `a` and `b`, in [-1, 1].
///
/// Returns 0 when either vector has zero magnitude. Fails when lengths differ.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
    if a.len() != b.len() {
        return Err(VibeError::dimension(a.len(), b.len()));
    }
    Ok(cosine(a.as_slice(), b.as_slice()))
}

pub(crate) fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    // `+ 0.0` folds -0.0 into 0.0 so orthogonal rows compare and print equal
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0) + 0.0
}

/// Map a cosine similarity linearly onto [0, 100].
#[must_use]
pub fn compatibility_score(cosine: f64) -> f64 {
    (cosine.clamp(-1.0, 1.0) + 1.0) / 2.0 * 100.0
}

/// Compatibility of two profile vectors on the 0-100 scale.
pub fn compatibility(a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
    cosine_similarity(a, b).map(compatibility_score)
}

/// Coarse reading of a compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchVerdict {
    GreatMatch,
    SomeOverlap,
    DifferentTastes,
}

impl MatchVerdict {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > GREAT_MATCH {
            Self::GreatMatch
        } else if score > SOME_OVERLAP {
            Self::SomeOverlap
        } else {
            Self::DifferentTastes
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::GreatMatch => "Great match",
            Self::SomeOverlap => "Some overlap",
            Self::DifferentTastes => "Different tastes",
        }
    }
}

/// Similarity between two profiles with its derived score and verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Compatibility {
    pub cosine: f64,
    pub score: f64,
    pub verdict: MatchVerdict,
}

impl Compatibility {
    pub fn between(a: &FeatureVector, b: &FeatureVector) -> Result<Self> {
        let cosine = cosine_similarity(a, b)?;
        let score = compatibility_score(cosine);
        Ok(Self {
            cosine,
            score,
            verdict: MatchVerdict::from_score(score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> FeatureVector {
        FeatureVector::new(values.to_vec())
    }

    #[test]
    fn test_identical_profiles() {
        let a = v(&[0.8, 0.9, 0.7, 0.1, 0.0]);
        let b = v(&[0.8, 0.9, 0.7, 0.1, 0.0]);
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((compatibility(&a, &b).unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(format!("{:.1}", compatibility(&a, &b).unwrap()), "100.0");
    }

    #[test]
    fn test_orthogonal() {
        let a = v(&[1.0, 0.0]);
        let b = v(&[0.0, 1.0]);
        assert!(cosine_similarity(&a, &b).unwrap().abs() < 1e-12);
        assert!((compatibility(&a, &b).unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite() {
        let a = v(&[1.0, 0.0]);
        let b = v(&[-1.0, 0.0]);
        assert!((cosine_similarity(&a, &b).unwrap() + 1.0).abs() < 1e-12);
        assert!(compatibility(&a, &b).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_negated_vector() {
        let a = v(&[0.3, -1.2, 4.5, 0.01]);
        let neg: FeatureVector = a.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&a, &neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let a = v(&[0.3, -1.2, 4.5]);
        let b = v(&[2.0, 0.5, -0.25]);
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_scale_invariant() {
        let a = v(&[0.5, 0.5, 0.5, 0.5]);
        let b = v(&[1.0, 1.0, 1.0, 1.0]);
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_is_neutral() {
        let zero = v(&[0.0, 0.0, 0.0]);
        let b = v(&[1.0, 0.0, 0.0]);
        assert_eq!(cosine_similarity(&zero, &b).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&b, &zero).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
        assert!((compatibility(&zero, &b).unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            cosine_similarity(&v(&[1.0, 0.0]), &v(&[1.0, 0.0, 0.0])),
            Err(VibeError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_score_monotonic_and_bounded() {
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=200 {
            let cosine = -1.0 + f64::from(step) * 0.01;
            let score = compatibility_score(cosine);
            assert!((0.0..=100.0).contains(&score));
            assert!(score > previous);
            previous = score;
        }
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(MatchVerdict::from_score(85.0), MatchVerdict::GreatMatch);
        assert_eq!(MatchVerdict::from_score(70.0), MatchVerdict::SomeOverlap);
        assert_eq!(MatchVerdict::from_score(50.0), MatchVerdict::DifferentTastes);
        assert_eq!(MatchVerdict::GreatMatch.label(), "Great match");
    }

    #[test]
    fn test_compatibility_between() {
        let c = Compatibility::between(&v(&[1.0, 0.0]), &v(&[0.0, 1.0])).unwrap();
        assert_eq!(c.verdict, MatchVerdict::DifferentTastes);
        assert!((c.score - 50.0).abs() < 1e-9);
    }
}
