//! Drives an external LIME engine over newline-delimited JSON.
//!
//! One explanation is one session:
//!
//! 1. host sends `explain` with the config, perturbation context and prediction
//! 2. engine sends any number of `predict` requests; host answers each with
//!    `outputs`, or `failure` when the model errors
//! 3. engine finishes with `result` or `error`
//!
//! The seed in the perturbation context is drawn from the explainer's
//! generator, so a seeded explainer sends the same seeds on every run.

use crate::config::{LimeConfig, PerturbationContext};
use crate::engine::{ExplainRequest, ExplanationEngine};
use crate::error::LimeError;
use crate::model::{Prediction, PredictionInput, PredictionOutput, checked_predict};
use crate::saliency::{Saliency, SaliencyResults};
use crate::transport::{ProcessTransport, Transport};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStderr;
use tracing::{debug, warn};

/// Messages sent from the host to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Explain {
        config: LimeConfig,
        context: PerturbationContext,
        prediction: Prediction,
    },
    Outputs {
        id: u64,
        outputs: Vec<PredictionOutput>,
    },
    Failure {
        id: u64,
        message: String,
    },
}

/// Messages sent from the engine to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineMessage {
    Predict {
        id: u64,
        inputs: Vec<PredictionInput>,
    },
    #[serde(rename = "result")]
    Finished {
        saliencies: BTreeMap<String, Saliency>,
    },
    Error {
        message: String,
    },
}

async fn send(transport: &mut (impl Transport + ?Sized), message: &HostMessage) -> Result<(), LimeError> {
    transport.write_message(&serde_json::to_string(message)?).await
}

/// Run one explanation session over `transport`.
pub async fn run_session<T: Transport + ?Sized>(
    transport: &mut T,
    request: ExplainRequest<'_>,
) -> Result<SaliencyResults, LimeError> {
    let ExplainRequest {
        config,
        rng,
        prediction,
        model,
    } = request;

    let context = config.perturbation_context(rng.r#gen::<u64>());
    send(
        transport,
        &HostMessage::Explain {
            config: config.clone(),
            context,
            prediction: prediction.clone(),
        },
    )
    .await?;

    let mut predict_calls = 0usize;
    loop {
        let line = transport
            .read_message()
            .await?
            .ok_or_else(|| LimeError::protocol("engine closed the stream before returning a result"))?;
        if line.is_empty() {
            continue;
        }

        let message: EngineMessage = serde_json::from_str(&line)
            .map_err(|e| LimeError::protocol(format!("invalid engine message: {e}")))?;

        match message {
            EngineMessage::Predict { id, inputs } => {
                predict_calls += 1;
                debug!(id, batch = inputs.len(), "Engine requested predictions");
                match checked_predict(model, &inputs) {
                    Ok(outputs) => send(transport, &HostMessage::Outputs { id, outputs }).await?,
                    Err(e) => {
                        // Let the engine stop cleanly before reporting the model's error.
                        let failure = HostMessage::Failure {
                            id,
                            message: e.to_string(),
                        };
                        if let Err(send_err) = send(transport, &failure).await {
                            warn!(error = %send_err, "Could not notify engine of model failure");
                        }
                        return Err(e);
                    }
                }
            }
            EngineMessage::Finished { saliencies } => {
                debug!(predict_calls, outputs = saliencies.len(), "Engine returned saliencies");
                transport.close().await?;
                return Ok(SaliencyResults::new(saliencies));
            }
            EngineMessage::Error { message } => {
                return Err(LimeError::engine(message));
            }
        }
    }
}

/// How to launch the external engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEngineConfig {
    /// Engine executable.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Session timeout in seconds; `None` (the default) waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProcessEngineConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout_secs: None,
        }
    }

    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_secs = timeout.map(|d| d.as_secs());
        self
    }
}

/// Time allowed for the engine to exit after the session ends.
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// An [`ExplanationEngine`] backed by an external executable.
///
/// Each call spawns the engine, runs one session and waits for the process
/// to exit. The call blocks on a private current-thread runtime, so it must
/// not be made from inside another tokio runtime.
pub struct ProcessEngine {
    config: ProcessEngineConfig,
}

impl ProcessEngine {
    pub fn new(config: ProcessEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessEngineConfig {
        &self.config
    }

    async fn explain_async(&self, request: ExplainRequest<'_>) -> Result<SaliencyResults, LimeError> {
        let (mut transport, mut child) =
            ProcessTransport::spawn(&self.config.command, &self.config.args, &self.config.env)
                .await?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        let session = run_session(&mut transport, request);
        let result = match self.config.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), session)
                .await
                .unwrap_or_else(|_| {
                    Err(LimeError::Timeout(format!(
                        "engine did not finish within {secs}s"
                    )))
                }),
            None => session.await,
        };

        transport.close().await?;
        match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
            Ok(Ok(status)) if !status.success() && result.is_ok() => {
                warn!(%status, "Engine exited with failure after returning a result");
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to wait for engine process"),
            Err(_) => {
                warn!("Engine did not exit, killing it");
                child.kill().await?;
            }
        }
        result
    }
}

impl ExplanationEngine for ProcessEngine {
    fn explain(&self, request: ExplainRequest<'_>) -> Result<SaliencyResults, LimeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.explain_async(request))
    }

    fn name(&self) -> &str {
        &self.config.command
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "limelight::engine", "{line}");
    }
}
