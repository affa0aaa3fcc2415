//! # limelight-core: LIME explanations and saliency views
//!
//! Configures and invokes a LIME (Local Interpretable Model-agnostic
//! Explanations) engine and renders the saliencies it returns.
//!
//! The explanation algorithm itself sits behind [`ExplanationEngine`]; the
//! bundled [`ProcessEngine`] drives an external engine executable over
//! newline-delimited JSON. Results come back as [`LimeResults`], which offers
//! a mapping view, a tabular frame, an HTML table, a static bar chart and
//! interactive hover charts.
//!
//! ```no_run
//! use limelight_core::{FnModel, LimeConfig, LimeExplainer, ProcessEngine, ProcessEngineConfig};
//!
//! let engine = ProcessEngine::new(ProcessEngineConfig::new("lime-engine"));
//! let mut explainer = LimeExplainer::new(LimeConfig::default().with_seed(7), engine)?;
//! let model = FnModel::new(|x: &[f64]| vec![x[0] + 2.0 * x[1]]);
//! let results = explainer.explain(vec![1.0, 3.0], vec![7.0], &model)?;
//! println!("{}", results.as_dataframe());
//! # Ok::<(), limelight_core::LimeError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod explainer;
pub mod model;
pub mod process;
pub mod results;
pub mod saliency;
pub mod transport;
pub mod view;

// Re-exports
pub use config::{EncodingParams, LimeConfig, PerturbationContext, load_config};
pub use engine::{ExplainRequest, ExplanationEngine};
pub use error::LimeError;
pub use explainer::LimeExplainer;
pub use model::{
    Feature, FnModel, IntoPredictionInput, IntoPredictionOutput, Output, Prediction,
    PredictionInput, PredictionOutput, PredictionProvider, Value, checked_predict,
};
pub use process::{ProcessEngine, ProcessEngineConfig};
pub use results::LimeResults;
pub use saliency::{FeatureImportance, Saliency, SaliencyResults};
pub use view::ExplanationVisualiser;
