//! End-to-end tests: explainer → engine → result views.

use limelight_core::view::{BarChart, ChartBackend};
use limelight_core::{
    ExplainRequest, ExplanationEngine, FeatureImportance, FnModel, LimeConfig, LimeError,
    LimeExplainer, PredictionInput, Saliency, SaliencyResults, checked_predict,
};
use pretty_assertions::assert_eq;
use rand::Rng;

/// Finite-difference engine: perturbs each feature by a random step and
/// scores it by the change in every output.
struct FiniteDifferenceEngine;

impl ExplanationEngine for FiniteDifferenceEngine {
    fn explain(&self, request: ExplainRequest<'_>) -> Result<SaliencyResults, LimeError> {
        let ExplainRequest {
            config,
            rng,
            prediction,
            model,
        } = request;
        let base = &prediction.input;
        let steps: Vec<f64> = (0..base.features.len())
            .map(|_| rng.gen_range(0.01..1.0) * config.perturbations as f64)
            .collect();

        let perturbed: Vec<PredictionInput> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let mut input = base.clone();
                let value = input.features[i].value.as_number() + step;
                input.features[i].value = value.into();
                input
            })
            .collect();
        let mut batch = vec![base.clone()];
        batch.extend(perturbed);
        let outputs = checked_predict(model, &batch)?;

        Ok(prediction
            .output
            .outputs
            .iter()
            .enumerate()
            .map(|(o, output)| {
                let reference = outputs[0].outputs[o].value.as_number();
                let pfis = base
                    .features
                    .iter()
                    .enumerate()
                    .map(|(i, feature)| {
                        let moved = outputs[i + 1].outputs[o].value.as_number();
                        FeatureImportance::new(feature.clone(), (moved - reference) / steps[i], 1.0)
                    })
                    .collect();
                (output.name.clone(), Saliency::new(pfis))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "finite-difference"
    }
}

#[derive(Default)]
struct RecordingBackend {
    charts: Vec<BarChart>,
}

impl ChartBackend for RecordingBackend {
    fn draw(&mut self, chart: &BarChart) -> Result<(), LimeError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

fn linear_model() -> FnModel<impl Fn(&[f64]) -> Vec<f64> + Send + Sync> {
    FnModel::new(|x: &[f64]| vec![2.0 * x[0] - 3.0 * x[1], x[2]]).with_output_names(["A", "B"])
}

fn explainer(seed: u64) -> LimeExplainer<FiniteDifferenceEngine> {
    LimeExplainer::new(LimeConfig::default().with_seed(seed), FiniteDifferenceEngine).unwrap()
}

#[test]
fn test_linear_model_saliencies() {
    let model = linear_model();
    let results = explainer(0)
        .explain(vec![1.0, 1.0, 5.0], vec![-1.0, 5.0], &model)
        .unwrap();

    let scores: Vec<f64> = results.map()["output-0"]
        .per_feature_importance
        .iter()
        .map(|p| (p.score * 1e6).round() / 1e6)
        .collect();
    assert_eq!(scores, vec![2.0, -3.0, 0.0]);
}

#[test]
fn test_map_keys_equal_output_names() {
    let model = linear_model();
    let mut outputs = std::collections::BTreeMap::new();
    outputs.insert("A".to_string(), -1.0);
    outputs.insert("B".to_string(), 5.0);
    let results = explainer(0)
        .explain(vec![1.0, 1.0, 5.0], outputs, &model)
        .unwrap();
    let keys: Vec<_> = results.map().keys().copied().collect();
    assert_eq!(keys, vec!["A", "B"]);
}

#[test]
fn test_same_seed_is_deterministic() {
    let model = linear_model();
    let a = explainer(42)
        .explain(vec![1.0, 2.0, 3.0], vec![-4.0, 3.0], &model)
        .unwrap();
    let b = explainer(42)
        .explain(vec![1.0, 2.0, 3.0], vec![-4.0, 3.0], &model)
        .unwrap();
    assert_eq!(a.as_dataframe(), b.as_dataframe());
}

#[test]
fn test_dataframe_shape() {
    let model = linear_model();
    let results = explainer(1)
        .explain(vec![1.0, 2.0, 3.0], vec![-4.0, 3.0], &model)
        .unwrap();
    let frame = results.as_dataframe();
    assert_eq!(frame.width(), 4 * results.map().len());
    for (output, saliency) in results.map() {
        let column = frame.column(&format!("{output}_features")).unwrap();
        assert_eq!(column.len(), saliency.len());
    }
}

#[test]
fn test_plot_draws_on_backend() {
    let model = linear_model();
    let results = explainer(1)
        .explain(vec![1.0, 2.0, 3.0], vec![-4.0, 3.0], &model)
        .unwrap();

    let mut backend = RecordingBackend::default();
    results.plot("output-0", &mut backend).unwrap();
    assert_eq!(backend.charts.len(), 1);
    assert_eq!(backend.charts[0].title, "LIME explanation of output-0");
    assert_eq!(backend.charts[0].bars[1].color, "#ee0000");

    let err = results.plot("missing", &mut backend).unwrap_err();
    assert!(matches!(err, LimeError::UnknownOutput(_)));
    assert_eq!(backend.charts.len(), 1);
}

#[test]
fn test_model_shape_error_propagates() {
    let model = FnModel::new(|_: &[f64]| vec![1.0]).with_output_names(["A", "B"]);
    let err = explainer(0)
        .explain(vec![1.0, 2.0, 3.0], vec![1.0, 2.0], &model)
        .unwrap_err();
    assert!(matches!(err, LimeError::Model(_)));
}
