//! Prediction records and the prediction provider interface.
//!
//! Callers hand features and outputs to the explainer in whatever shape is
//! convenient (plain vectors, name/value maps, or ready-made records). The
//! [`IntoPredictionInput`] and [`IntoPredictionOutput`] conversions normalise
//! them into one [`Prediction`]. Generated names follow `input-{i}` and
//! `output-{i}`.

use crate::error::LimeError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A feature or output value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    Categorical(String),
}

impl Value {
    /// Numeric view of the value. Text that does not parse becomes NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Categorical(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Categorical(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Categorical(s.to_string())
    }
}

/// A named model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: Value,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn numerical(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, Value::Number(value))
    }
}

/// A named model output with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub value: Value,
    #[serde(default = "default_output_score")]
    pub score: f64,
}

fn default_output_score() -> f64 {
    1.0
}

impl Output {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            score: default_output_score(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// One feature vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionInput {
    pub features: Vec<Feature>,
}

impl PredictionInput {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Feature values as numbers, in order.
    pub fn values(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.value.as_number()).collect()
    }
}

/// One output vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub outputs: Vec<Output>,
}

impl PredictionOutput {
    pub fn new(outputs: Vec<Output>) -> Self {
        Self { outputs }
    }

    pub fn names(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.name.as_str()).collect()
    }
}

/// A paired input/output record: the prediction being explained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub input: PredictionInput,
    pub output: PredictionOutput,
}

impl Prediction {
    /// Convert caller-supplied inputs and outputs into one record.
    pub fn simple(
        inputs: impl IntoPredictionInput,
        outputs: impl IntoPredictionOutput,
    ) -> Result<Self, LimeError> {
        Ok(Self {
            input: inputs.into_prediction_input()?,
            output: outputs.into_prediction_output()?,
        })
    }
}

/// Conversion into a [`PredictionInput`].
pub trait IntoPredictionInput {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError>;
}

/// Conversion into a [`PredictionOutput`].
pub trait IntoPredictionOutput {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError>;
}

fn ensure_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<(), LimeError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(LimeError::conversion(format!(
                "duplicate {kind} name '{name}'"
            )));
        }
    }
    Ok(())
}

fn checked_input(features: Vec<Feature>) -> Result<PredictionInput, LimeError> {
    if features.is_empty() {
        return Err(LimeError::conversion("input has no features"));
    }
    ensure_unique("feature", features.iter().map(|f| f.name.as_str()))?;
    Ok(PredictionInput::new(features))
}

fn checked_output(outputs: Vec<Output>) -> Result<PredictionOutput, LimeError> {
    if outputs.is_empty() {
        return Err(LimeError::conversion("output has no values"));
    }
    ensure_unique("output", outputs.iter().map(|o| o.name.as_str()))?;
    Ok(PredictionOutput::new(outputs))
}

impl IntoPredictionInput for PredictionInput {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError> {
        checked_input(self.features)
    }
}

impl IntoPredictionInput for Vec<Feature> {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError> {
        checked_input(self)
    }
}

impl IntoPredictionInput for &[f64] {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError> {
        checked_input(
            self.iter()
                .enumerate()
                .map(|(i, v)| Feature::numerical(format!("input-{i}"), *v))
                .collect(),
        )
    }
}

impl IntoPredictionInput for Vec<f64> {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError> {
        self.as_slice().into_prediction_input()
    }
}

impl<V: Into<Value>> IntoPredictionInput for BTreeMap<String, V> {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError> {
        checked_input(
            self.into_iter()
                .map(|(name, value)| Feature::new(name, value))
                .collect(),
        )
    }
}

/// Hash maps carry no order, so features are sorted by name.
impl<V: Into<Value>> IntoPredictionInput for HashMap<String, V> {
    fn into_prediction_input(self) -> Result<PredictionInput, LimeError> {
        self.into_iter()
            .collect::<BTreeMap<_, _>>()
            .into_prediction_input()
    }
}

impl IntoPredictionOutput for PredictionOutput {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError> {
        checked_output(self.outputs)
    }
}

impl IntoPredictionOutput for Vec<Output> {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError> {
        checked_output(self)
    }
}

impl IntoPredictionOutput for &[f64] {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError> {
        checked_output(
            self.iter()
                .enumerate()
                .map(|(i, v)| Output::new(format!("output-{i}"), *v))
                .collect(),
        )
    }
}

impl IntoPredictionOutput for Vec<f64> {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError> {
        self.as_slice().into_prediction_output()
    }
}

impl<V: Into<Value>> IntoPredictionOutput for BTreeMap<String, V> {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError> {
        checked_output(
            self.into_iter()
                .map(|(name, value)| Output::new(name, value))
                .collect(),
        )
    }
}

impl<V: Into<Value>> IntoPredictionOutput for HashMap<String, V> {
    fn into_prediction_output(self) -> Result<PredictionOutput, LimeError> {
        self.into_iter()
            .collect::<BTreeMap<_, _>>()
            .into_prediction_output()
    }
}

/// A model that can be explained.
///
/// Implementations must return exactly one [`PredictionOutput`] per input,
/// in the same order. Engines call [`checked_predict`], which turns a
/// violation into [`LimeError::ShapeMismatch`].
pub trait PredictionProvider: Send + Sync {
    fn predict(&self, inputs: &[PredictionInput]) -> Result<Vec<PredictionOutput>, LimeError>;
}

/// Call `model` and enforce the one-output-per-input contract.
pub fn checked_predict(
    model: &dyn PredictionProvider,
    inputs: &[PredictionInput],
) -> Result<Vec<PredictionOutput>, LimeError> {
    let outputs = model.predict(inputs)?;
    if outputs.len() != inputs.len() {
        return Err(LimeError::ShapeMismatch {
            expected: inputs.len(),
            actual: outputs.len(),
        });
    }
    Ok(outputs)
}

/// Adapts a numeric closure into a [`PredictionProvider`].
pub struct FnModel<F> {
    func: F,
    output_names: Option<Vec<String>>,
}

impl<F> FnModel<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            output_names: None,
        }
    }

    /// Name the closure's outputs instead of using `output-{i}`.
    pub fn with_output_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.output_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn output_name(&self, index: usize) -> String {
        self.output_names
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("output-{index}"))
    }
}

impl<F> PredictionProvider for FnModel<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    fn predict(&self, inputs: &[PredictionInput]) -> Result<Vec<PredictionOutput>, LimeError> {
        inputs
            .iter()
            .map(|input| {
                let values = (self.func)(&input.values());
                if let Some(names) = &self.output_names {
                    if names.len() != values.len() {
                        return Err(LimeError::model(format!(
                            "model returned {} values for {} named outputs",
                            values.len(),
                            names.len()
                        )));
                    }
                }
                Ok(PredictionOutput::new(
                    values
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| Output::new(self.output_name(i), v))
                        .collect(),
                ))
            })
            .collect()
    }
}
