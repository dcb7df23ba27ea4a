/// Failures raised by the numeric core.
///
/// Every variant names the precondition that was violated. None of them is
/// transient: calling again with the same inputs fails the same way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VibeError {
    #[error("no tracks to aggregate into a profile")]
    EmptyInput,

    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("scale model has not been fitted")]
    NotFitted,

    #[error("feature {feature:?} has zero variance across the catalog")]
    DegenerateFeature { feature: String },

    #[error("cannot partition {rows} rows into {k} clusters")]
    InvalidClusterCount { k: usize, rows: usize },

    #[error("requested {0} recommendations, need at least 1")]
    InvalidRequestSize(usize),

    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("unknown track: {0}")]
    UnknownTrack(String),
}

impl VibeError {
    pub(crate) fn dimension(expected: usize, got: usize) -> Self {
        Self::SchemaMismatch(format!("expected {expected} features, got {got}"))
    }

    pub(crate) fn missing_feature(track: &str, feature: &str) -> Self {
        Self::SchemaMismatch(format!("track {track:?} has no numeric {feature:?}"))
    }
}

pub type Result<T> = std::result::Result<T, VibeError>;
