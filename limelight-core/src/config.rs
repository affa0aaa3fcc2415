//! Explainer configuration.
//!
//! [`LimeConfig`] carries every option the external engine understands.
//! Defaults live in per-field `serde` default functions so that partial TOML
//! files and `LIMELIGHT_*` environment variables layer cleanly on top of them
//! through [`load_config`]. Unknown keys are ignored. `adaptive_variance`
//! and `encoding_params` are fixed: they are serialised for the engine but
//! never read back from files, env vars or overrides.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name for workspace-level configuration.
pub const WORKSPACE_CONFIG_DIR: &str = ".limelight";

/// Fixed encoding parameters handed to the engine's feature clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingParams {
    pub cluster_threshold: f64,
    pub cluster_width: f64,
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self {
            cluster_threshold: 0.07,
            cluster_width: 0.3,
        }
    }
}

/// Seed and perturbation count for one explanation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerturbationContext {
    pub seed: u64,
    pub perturbations: usize,
}

/// LIME explainer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimeConfig {
    /// Number of samples generated for the local surrogate model.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Starting number of feature perturbations.
    #[serde(default = "default_perturbations")]
    pub perturbations: usize,
    /// Random seed for the explainer-owned generator.
    #[serde(default)]
    pub seed: u64,
    /// Normalise saliencies into [0, 1].
    #[serde(default)]
    pub normalise_weights: bool,
    /// Penalise features likely to produce linearly inseparable outputs.
    #[serde(default = "default_true")]
    pub penalise_sparse_balance: bool,
    /// Weighted linear regression surrogate; a multilayer perceptron otherwise.
    #[serde(default = "default_true")]
    pub use_wlr_model: bool,
    /// Keep counterfactuals produced as a byproduct of sampling.
    #[serde(default)]
    pub track_counterfactuals: bool,
    /// Always on.
    #[serde(skip_deserializing, default = "default_true")]
    pub adaptive_variance: bool,
    #[serde(skip_deserializing, default)]
    pub encoding_params: EncodingParams,
}

impl Default for LimeConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            perturbations: default_perturbations(),
            seed: 0,
            normalise_weights: false,
            penalise_sparse_balance: true,
            use_wlr_model: true,
            track_counterfactuals: false,
            adaptive_variance: true,
            encoding_params: EncodingParams::default(),
        }
    }
}

fn default_samples() -> usize {
    10
}

fn default_perturbations() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl LimeConfig {
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_perturbations(mut self, perturbations: usize) -> Self {
        self.perturbations = perturbations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_normalise_weights(mut self, normalise: bool) -> Self {
        self.normalise_weights = normalise;
        self
    }

    pub fn with_penalise_sparse_balance(mut self, penalise: bool) -> Self {
        self.penalise_sparse_balance = penalise;
        self
    }

    pub fn with_wlr_model(mut self, use_wlr: bool) -> Self {
        self.use_wlr_model = use_wlr;
        self
    }

    pub fn with_track_counterfactuals(mut self, track: bool) -> Self {
        self.track_counterfactuals = track;
        self
    }

    /// Build the perturbation context for a run seeded with `seed`.
    pub fn perturbation_context(&self, seed: u64) -> PerturbationContext {
        PerturbationContext {
            seed,
            perturbations: self.perturbations,
        }
    }
}

/// Path of the user-level config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "limelight", "limelight")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_CONFIG_DIR).join("config.toml")
}

/// Load configuration with layered merging.
///
/// Order (later wins): defaults, `~/.config/limelight/config.toml`,
/// `<workspace>/.limelight/config.toml`, `LIMELIGHT_*` environment
/// variables, then explicit overrides.
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&LimeConfig>,
) -> Result<LimeConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(LimeConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // LIMELIGHT_SAMPLES, LIMELIGHT_USE_WLR_MODEL, ...
    figment = figment.merge(Env::prefixed("LIMELIGHT_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}
