//! Fitted scaler and classifier artifacts.
//!
//! The service treats both as opaque: it only needs `transform` from the
//! scaler and `predict` from the classifier. The concrete kinds below are what
//! the training pipeline exports, tagged by a `"kind"` field in the JSON.

use crate::error::{Result, ServiceError};
use serde::Deserialize;

pub trait Scaler: Send + Sync {
    fn n_features(&self) -> usize;
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>>;
}

/// Predicted class plus the probability of the positive class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: i64,
    pub probability: f64,
}

pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;
    fn predict(&self, x: &[f64]) -> Result<Prediction>;
}

fn check_len(x: &[f64], expected: usize) -> Result<()> {
    if x.len() != expected {
        return Err(ServiceError::FeatureLength {
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

fn binary_classes() -> [i64; 2] {
    [0, 1]
}

fn yes() -> bool {
    true
}

// ---------- Scalers ----------

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
    Identity { n_features: usize },
}

/// `(x - mean) / scale`, per column.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "yes")]
    pub with_mean: bool,
    #[serde(default = "yes")]
    pub with_std: bool,
}

/// `x * scale + min`, per column.
#[derive(Debug, Clone, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FittedScaler {
    /// Internal consistency of the fitted parameters.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let (a, b) = match self {
            FittedScaler::Standard(s) => (&s.mean, &s.scale),
            FittedScaler::MinMax(s) => (&s.min, &s.scale),
            FittedScaler::Identity { n_features } => {
                return if *n_features == 0 {
                    Err("identity scaler has zero features".into())
                } else {
                    Ok(())
                };
            }
        };
        if a.is_empty() {
            return Err("scaler has no fitted columns".into());
        }
        if a.len() != b.len() {
            return Err(format!(
                "scaler parameter lengths differ: {} vs {}",
                a.len(),
                b.len()
            ));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters contain non-finite values".into());
        }
        Ok(())
    }
}

impl Scaler for FittedScaler {
    fn n_features(&self) -> usize {
        match self {
            FittedScaler::Standard(s) => s.mean.len(),
            FittedScaler::MinMax(s) => s.min.len(),
            FittedScaler::Identity { n_features } => *n_features,
        }
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_len(x, self.n_features())?;
        let out = match self {
            FittedScaler::Standard(s) => x
                .iter()
                .zip(s.mean.iter().zip(&s.scale))
                .map(|(v, (mean, scale))| {
                    let centered = if s.with_mean { v - mean } else { *v };
                    // zero-variance columns were fitted with scale 1
                    if s.with_std && *scale != 0.0 {
                        centered / scale
                    } else {
                        centered
                    }
                })
                .collect(),
            FittedScaler::MinMax(s) => x
                .iter()
                .zip(s.min.iter().zip(&s.scale))
                .map(|(v, (min, scale))| v * scale + min)
                .collect(),
            FittedScaler::Identity { .. } => x.to_vec(),
        };
        Ok(out)
    }
}

// ---------- Classifiers ----------

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedClassifier {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "binary_classes")]
    pub classes: [i64; 2],
}

impl LogisticRegression {
    fn decision(&self, x: &[f64]) -> f64 {
        self.coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.intercept
    }
}

const LEAF: i64 = -1;

/// Array-encoded binary tree: node `i` splits on `feature[i] <= threshold[i]`
/// and is a leaf when both children are `-1`. `value[i]` holds the class
/// weights seen at that node during fitting.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
    #[serde(default = "binary_classes")]
    pub classes: [i64; 2],
}

impl DecisionTree {
    fn validate(&self) -> std::result::Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("tree node arrays have different lengths".into());
        }
        for i in 0..n {
            let (l, r) = (self.children_left[i], self.children_right[i]);
            if l == LEAF || r == LEAF {
                if l != r {
                    return Err(format!("node {i} has exactly one child"));
                }
                let [a, b] = self.value[i];
                if a < 0.0 || b < 0.0 || a + b <= 0.0 || !(a + b).is_finite() {
                    return Err(format!("leaf {i} has no usable class weights"));
                }
                continue;
            }
            // children always come after their parent, which rules out cycles
            for child in [l, r] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {i} points to invalid child {child}"));
                }
            }
            let f = self.feature[i];
            if f < 0 || f as usize >= self.n_features {
                return Err(format!("node {i} splits on out-of-range feature {f}"));
            }
            if self.threshold[i].is_nan() {
                return Err(format!("node {i} has a NaN threshold"));
            }
        }
        Ok(())
    }

    fn proba(&self, x: &[f64]) -> [f64; 2] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [a, b] = self.value[node];
        let total = a + b;
        [a / total, b / total]
    }
}

/// Mean of the member trees' class probabilities.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub estimators: Vec<DecisionTree>,
    #[serde(default = "binary_classes")]
    pub classes: [i64; 2],
}

impl RandomForest {
    fn proba(&self, x: &[f64]) -> [f64; 2] {
        let mut sum = [0.0, 0.0];
        for tree in &self.estimators {
            let p = tree.proba(x);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.estimators.len() as f64;
        [sum[0] / n, sum[1] / n]
    }
}

fn argmax_label(p: [f64; 2], classes: [i64; 2]) -> i64 {
    // ties go to the first class
    if p[1] > p[0] {
        classes[1]
    } else {
        classes[0]
    }
}

impl FittedClassifier {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            FittedClassifier::LogisticRegression(m) => {
                if m.coef.is_empty() {
                    return Err("logistic regression has no coefficients".into());
                }
                if m.coef.iter().any(|w| !w.is_finite()) || !m.intercept.is_finite() {
                    return Err("logistic regression has non-finite weights".into());
                }
                Ok(())
            }
            FittedClassifier::DecisionTree(t) => t.validate(),
            FittedClassifier::RandomForest(f) => {
                let first = f
                    .estimators
                    .first()
                    .ok_or_else(|| "random forest has no estimators".to_string())?;
                for (i, tree) in f.estimators.iter().enumerate() {
                    tree.validate().map_err(|e| format!("estimator {i}: {e}"))?;
                    if tree.n_features != first.n_features {
                        return Err(format!(
                            "estimator {i} expects {} features, estimator 0 expects {}",
                            tree.n_features, first.n_features
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

impl Classifier for FittedClassifier {
    fn n_features(&self) -> usize {
        match self {
            FittedClassifier::LogisticRegression(m) => m.coef.len(),
            FittedClassifier::DecisionTree(t) => t.n_features,
            FittedClassifier::RandomForest(f) => {
                f.estimators.first().map(|t| t.n_features).unwrap_or(0)
            }
        }
    }

    fn predict(&self, x: &[f64]) -> Result<Prediction> {
        check_len(x, self.n_features())?;
        let prediction = match self {
            FittedClassifier::LogisticRegression(m) => {
                let z = m.decision(x);
                Prediction {
                    label: if z > 0.0 { m.classes[1] } else { m.classes[0] },
                    probability: 1.0 / (1.0 + (-z).exp()),
                }
            }
            FittedClassifier::DecisionTree(t) => {
                let p = t.proba(x);
                Prediction {
                    label: argmax_label(p, t.classes),
                    probability: p[1],
                }
            }
            FittedClassifier::RandomForest(f) => {
                let p = f.proba(x);
                Prediction {
                    label: argmax_label(p, f.classes),
                    probability: p[1],
                }
            }
        };
        Ok(prediction)
    }
}
