use crate::error::{Result, ServiceError};
use crate::types::PredictionRequest;
use std::str::FromStr;

/// A column of [`PredictionRequest`] the model can be trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    TaskComplexityLow,
    TaskComplexityMedium,
    StartDelayMin,
    LastMinuteRush,
    FocusRating,
    DistractionsCount,
    CoffeeIntakeMg,
    TaskQualityScore,
    StressLevel,
}

impl Feature {
    /// Schema declaration order. The model does not necessarily use it.
    pub const ALL: [Feature; 9] = [
        Feature::TaskComplexityLow,
        Feature::TaskComplexityMedium,
        Feature::StartDelayMin,
        Feature::LastMinuteRush,
        Feature::FocusRating,
        Feature::DistractionsCount,
        Feature::CoffeeIntakeMg,
        Feature::TaskQualityScore,
        Feature::StressLevel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::TaskComplexityLow => "task_complexity_low",
            Feature::TaskComplexityMedium => "task_complexity_medium",
            Feature::StartDelayMin => "start_delay_min",
            Feature::LastMinuteRush => "last_minute_rush",
            Feature::FocusRating => "focus_rating",
            Feature::DistractionsCount => "distractions_count",
            Feature::CoffeeIntakeMg => "coffee_intake_mg",
            Feature::TaskQualityScore => "task_quality_score",
            Feature::StressLevel => "stress_level",
        }
    }

    pub fn read(self, req: &PredictionRequest) -> i64 {
        match self {
            Feature::TaskComplexityLow => req.task_complexity_low,
            Feature::TaskComplexityMedium => req.task_complexity_medium,
            Feature::StartDelayMin => req.start_delay_min,
            Feature::LastMinuteRush => req.last_minute_rush,
            Feature::FocusRating => req.focus_rating,
            Feature::DistractionsCount => req.distractions_count,
            Feature::CoffeeIntakeMg => req.coffee_intake_mg,
            Feature::TaskQualityScore => req.task_quality_score,
            Feature::StressLevel => req.stress_level,
        }
    }
}

impl FromStr for Feature {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ServiceError::SchemaMismatch {
                field: s.to_string(),
            })
    }
}

/// Column order the scaler and model were fitted with.
///
/// Names are resolved against the request schema once, when the order is
/// built, so assembling a vector per request cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOrder {
    columns: Vec<Feature>,
}

impl FeatureOrder {
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = names
            .into_iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<Feature>>>()?;
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Feature] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|f| f.name()).collect()
    }

    /// Request -> ordered vector
    pub fn assemble(&self, req: &PredictionRequest) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.columns.len());
        for f in &self.columns {
            v.push(f.read(req) as f64);
        }
        v
    }
}
