//! Procrastination risk prediction over HTTP.
//!
//! Three artifacts produced by the training pipeline (feature order, fitted
//! scaler, fitted binary classifier) are loaded once at startup and shared by
//! every request to `POST /predict`.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod server;
pub mod types;

pub use artifacts::{ArtifactPaths, Artifacts};
pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use predictor::Predictor;
pub use types::{PredictionRequest, PredictionResponse};
