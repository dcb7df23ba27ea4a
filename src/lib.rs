//! Music taste compatibility and content-based recommendations.
//!
//! Tracks are described by a configurable, ordered set of audio features.
//! A user's taste is the mean of their liked tracks; catalogs are
//! standardized per feature, compared by cosine similarity, clustered into
//! taste groups and ranked against a profile.
//!
//! ```
//! use vibe_match::{FeatureVector, compatibility};
//!
//! let a = FeatureVector::new(vec![1.0, 0.0]);
//! let b = FeatureVector::new(vec![0.0, 1.0]);
//! assert!((compatibility(&a, &b).unwrap() - 50.0).abs() < 1e-9);
//! ```

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod catalog;
pub mod cluster;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod profile;
pub mod recommend;
pub mod scale;
pub mod similarity;

pub use catalog::{Catalog, FeatureMatrix, TrackRecord, load_catalog};
pub use cluster::{ClusterAssignment, ClusterConfig, Clustering, cluster, cluster_with};
pub use config::Config;
pub use error::{Result, VibeError};
pub use models::{FeatureSchema, FeatureVector, Track};
pub use pipeline::{CompatibilityReport, TastePipeline, raw_compatibility};
pub use profile::{Profile, aggregate_profile, aggregate_vectors};
pub use recommend::{ScoredTrack, recommend, recommend_excluding};
pub use scale::{DegeneratePolicy, Normalizer, ScaleModel};
pub use similarity::{
    Compatibility, MatchVerdict, compatibility, compatibility_score, cosine_similarity,
};
