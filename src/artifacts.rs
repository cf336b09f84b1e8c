use crate::error::{Artifact, Result, ServiceError};
use crate::features::FeatureOrder;
use crate::model::{Classifier, FittedClassifier, FittedScaler, Scaler};
use serde::de::DeserializeOwned;
use std::{fs, path::Path, path::PathBuf};
use tracing::info;

/// Where the training pipeline left its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub feature_order: PathBuf,
}

/// The three fitted artifacts, checked against each other.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub order: FeatureOrder,
    pub scaler: FittedScaler,
    pub model: FittedClassifier,
}

fn read_json<T: DeserializeOwned>(artifact: Artifact, path: &Path) -> Result<T> {
    let txt = fs::read_to_string(path).map_err(|source| ServiceError::ArtifactMissing {
        artifact,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|e| ServiceError::corrupt(artifact, path, e.to_string()))
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let names: Vec<String> = read_json(Artifact::FeatureOrder, &paths.feature_order)?;
        if names.is_empty() {
            return Err(ServiceError::corrupt(
                Artifact::FeatureOrder,
                &paths.feature_order,
                "feature order is empty",
            ));
        }
        let order = FeatureOrder::from_names(&names)?;
        info!(
            path = %paths.feature_order.display(),
            "loaded feature order [{}]: {:?}",
            order.len(),
            order.names()
        );

        let scaler: FittedScaler = read_json(Artifact::Scaler, &paths.scaler)?;
        scaler
            .validate()
            .map_err(|e| ServiceError::corrupt(Artifact::Scaler, &paths.scaler, e))?;
        info!(path = %paths.scaler.display(), in_dim = scaler.n_features(), "loaded scaler");

        let model: FittedClassifier = read_json(Artifact::Model, &paths.model)?;
        model
            .validate()
            .map_err(|e| ServiceError::corrupt(Artifact::Model, &paths.model, e))?;
        info!(path = %paths.model.display(), in_dim = model.n_features(), "loaded model");

        Self::from_parts(order, scaler, model)
    }

    /// Assembles already-parsed artifacts, enforcing a common feature width.
    pub fn from_parts(order: FeatureOrder, scaler: FittedScaler, model: FittedClassifier) -> Result<Self> {
        let expected = order.len();
        if scaler.n_features() != expected {
            return Err(ServiceError::ShapeMismatch {
                artifact: Artifact::Scaler,
                expected,
                actual: scaler.n_features(),
            });
        }
        if model.n_features() != expected {
            return Err(ServiceError::ShapeMismatch {
                artifact: Artifact::Model,
                expected,
                actual: model.n_features(),
            });
        }
        Ok(Self { order, scaler, model })
    }
}
