use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Which of the three startup artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Model,
    Scaler,
    FeatureOrder,
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Artifact::Model => "model",
            Artifact::Scaler => "scaler",
            Artifact::FeatureOrder => "feature order",
        })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{artifact} artifact not readable at {}: {source}", path.display())]
    ArtifactMissing {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{artifact} artifact at {} is corrupt: {reason}", path.display())]
    ArtifactCorrupt {
        artifact: Artifact,
        path: PathBuf,
        reason: String,
    },

    /// Feature order names something PredictionRequest does not have.
    #[error("feature order references unknown field `{field}`")]
    SchemaMismatch { field: String },

    #[error("{artifact} expects {actual} features but the feature order has {expected}")]
    ShapeMismatch {
        artifact: Artifact,
        expected: usize,
        actual: usize,
    },

    #[error("feature length mismatch: got {actual}, expected {expected}")]
    FeatureLength { expected: usize, actual: usize },

    #[error("invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

impl ServiceError {
    pub fn corrupt(artifact: Artifact, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactCorrupt {
            artifact,
            path: path.into(),
            reason: reason.into(),
        }
    }
}
