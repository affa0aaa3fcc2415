//! Saliency results returned by an explanation engine.

use crate::model::Feature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Importance of one feature for one output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// The explained feature with its original value.
    pub feature: Feature,
    /// Signed contribution; the sign gives the direction.
    pub score: f64,
    /// Confidence of the reported score, expected in [0, 1].
    #[serde(default)]
    pub confidence: f64,
}

impl FeatureImportance {
    pub fn new(feature: Feature, score: f64, confidence: f64) -> Self {
        Self {
            feature,
            score,
            confidence,
        }
    }
}

/// Per-feature importances explaining a single output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Saliency {
    pub per_feature_importance: Vec<FeatureImportance>,
}

impl Saliency {
    pub fn new(per_feature_importance: Vec<FeatureImportance>) -> Self {
        Self {
            per_feature_importance,
        }
    }

    pub fn len(&self) -> usize {
        self.per_feature_importance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_feature_importance.is_empty()
    }

    /// The `n` features with the largest absolute score.
    pub fn top_features(&self, n: usize) -> Vec<&FeatureImportance> {
        let mut items: Vec<_> = self.per_feature_importance.iter().collect();
        items.sort_by(|a, b| {
            b.score
                .abs()
                .partial_cmp(&a.score.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        items.into_iter().take(n).collect()
    }
}

/// Saliencies for every output of one explained prediction, keyed by output name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaliencyResults {
    pub saliencies: BTreeMap<String, Saliency>,
}

impl SaliencyResults {
    pub fn new(saliencies: BTreeMap<String, Saliency>) -> Self {
        Self { saliencies }
    }

    pub fn get(&self, output: &str) -> Option<&Saliency> {
        self.saliencies.get(output)
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.saliencies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.saliencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saliencies.is_empty()
    }
}

impl FromIterator<(String, Saliency)> for SaliencyResults {
    fn from_iter<I: IntoIterator<Item = (String, Saliency)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
