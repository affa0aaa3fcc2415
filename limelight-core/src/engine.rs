//! The explanation engine seam.
//!
//! The LIME algorithm itself (perturbation sampling, surrogate fitting,
//! saliency computation) lives behind [`ExplanationEngine`]. This crate ships
//! [`ProcessEngine`](crate::process::ProcessEngine), which drives an external
//! engine executable; tests plug in deterministic stubs.

use crate::config::LimeConfig;
use crate::error::LimeError;
use crate::model::{Prediction, PredictionProvider};
use crate::saliency::SaliencyResults;
use rand::rngs::StdRng;

/// Everything an engine needs for one explanation.
pub struct ExplainRequest<'a> {
    pub config: &'a LimeConfig,
    /// Generator owned by the calling explainer.
    pub rng: &'a mut StdRng,
    pub prediction: &'a Prediction,
    pub model: &'a dyn PredictionProvider,
}

/// A synchronous LIME implementation.
pub trait ExplanationEngine {
    /// Produce saliencies for every output of `request.prediction`.
    fn explain(&self, request: ExplainRequest<'_>) -> Result<SaliencyResults, LimeError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "engine"
    }
}

impl<E: ExplanationEngine + ?Sized> ExplanationEngine for Box<E> {
    fn explain(&self, request: ExplainRequest<'_>) -> Result<SaliencyResults, LimeError> {
        (**self).explain(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: ExplanationEngine + ?Sized> ExplanationEngine for &E {
    fn explain(&self, request: ExplainRequest<'_>) -> Result<SaliencyResults, LimeError> {
        (**self).explain(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
