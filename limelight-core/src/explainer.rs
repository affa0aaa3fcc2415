//! The LIME explainer: configuration in, [`LimeResults`] out.

use crate::config::LimeConfig;
use crate::engine::{ExplainRequest, ExplanationEngine};
use crate::error::LimeError;
use crate::model::{IntoPredictionInput, IntoPredictionOutput, Prediction, PredictionProvider};
use crate::results::LimeResults;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;
use tracing::{debug, info};

/// *"Which features were most important to the results?"*
///
/// LIME answers this by producing saliencies: weights for each input feature
/// describing how strongly that feature contributed to each model output.
/// The explainer owns its random generator, seeded from
/// [`LimeConfig::seed`], and hands it to the engine on every call. Two
/// explainers built from the same config therefore produce the same
/// sequence of explanations.
pub struct LimeExplainer<E> {
    config: LimeConfig,
    rng: StdRng,
    engine: E,
}

impl<E: ExplanationEngine> LimeExplainer<E> {
    /// Build an explainer. Does not touch the engine.
    pub fn new(config: LimeConfig, engine: E) -> Result<Self, LimeError> {
        if config.samples == 0 {
            return Err(LimeError::config("samples must be at least 1"));
        }
        if config.perturbations == 0 {
            return Err(LimeError::config("perturbations must be at least 1"));
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            engine,
        })
    }

    pub fn config(&self) -> &LimeConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Produce a LIME explanation.
    ///
    /// `outputs` are the model's outputs for `inputs`, i.e.
    /// `outputs = model(inputs)`. Both accept any shape with an
    /// [`IntoPredictionInput`] / [`IntoPredictionOutput`] conversion. Blocks
    /// until the engine finishes.
    pub fn explain(
        &mut self,
        inputs: impl IntoPredictionInput,
        outputs: impl IntoPredictionOutput,
        model: &dyn PredictionProvider,
    ) -> Result<LimeResults, LimeError> {
        let prediction = Prediction::simple(inputs, outputs)?;
        let start = Instant::now();
        debug!(
            engine = self.engine.name(),
            samples = self.config.samples,
            features = prediction.input.features.len(),
            outputs = prediction.output.outputs.len(),
            "Starting LIME explanation"
        );

        let saliencies = self.engine.explain(ExplainRequest {
            config: &self.config,
            rng: &mut self.rng,
            prediction: &prediction,
            model,
        })?;

        info!(
            engine = self.engine.name(),
            outputs = saliencies.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "LIME explanation complete"
        );
        Ok(LimeResults::new(saliencies))
    }
}
