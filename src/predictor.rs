use crate::artifacts::Artifacts;
use crate::error::Result;
use crate::model::{Classifier, Scaler};
use crate::types::{PredictionRequest, PredictionResponse};
use tracing::info;

/// Request -> ordered vector -> scaler -> classifier.
///
/// Holds only immutable state, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: Artifacts,
    log_predictions: bool,
}

impl Predictor {
    pub fn new(artifacts: Artifacts) -> Self {
        Self {
            artifacts,
            log_predictions: false,
        }
    }

    /// Log a summary of every assembled vector at info level.
    pub fn with_prediction_logging(mut self, enabled: bool) -> Self {
        self.log_predictions = enabled;
        self
    }

    pub fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse> {
        let vec = self.artifacts.order.assemble(req);
        if self.log_predictions {
            self.log_vector(&vec);
        }

        let scaled = self.artifacts.scaler.transform(&vec)?;
        let out = self.artifacts.model.predict(&scaled)?;

        if self.log_predictions {
            info!(prediction = out.label, risk_score = out.probability, "predicted");
        }
        Ok(PredictionResponse {
            procrastination_prediction: out.label,
            risk_score: out.probability,
        })
    }

    /// Push an all-zeros vector through scaler and model once.
    pub fn warmup(&self) -> Result<()> {
        let zeros = vec![0.0; self.artifacts.order.len()];
        let scaled = self.artifacts.scaler.transform(&zeros)?;
        self.artifacts.model.predict(&scaled)?;
        Ok(())
    }

    fn log_vector(&self, vec: &[f64]) {
        let nz = vec.iter().filter(|x| **x != 0.0).count();
        let mean = if vec.is_empty() { 0.0 } else { vec.iter().sum::<f64>() / vec.len() as f64 };
        let std = if vec.len() < 2 {
            0.0
        } else {
            (vec.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / vec.len() as f64).sqrt()
        };
        let sample: Vec<String> = self
            .artifacts
            .order
            .columns()
            .iter()
            .zip(vec)
            .take(6)
            .map(|(f, v)| format!("{}={}", f.name(), v))
            .collect();
        info!(
            "recv in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
            vec.len(),
            nz,
            mean,
            std,
            sample.join(", ")
        );
    }
}
