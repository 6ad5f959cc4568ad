use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, warn};

use crate::error::ScorerError;
use crate::inference::{BatchScorer, InferenceResult};
use crate::records::{Feature, FeatureVector, NUM_FEATURES};
use crate::schema::v1::{Classification, Probabilities};

pub const DEFAULT_SCORER_PROGRAM: &str = "python3";
pub const DEFAULT_SCORER_SCRIPT: &str = "ml_engine/predict.py";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STDERR_LOG_LIMIT: usize = 512;

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_SCORER_PROGRAM.to_string(),
            args: vec![DEFAULT_SCORER_SCRIPT.to_string()],
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Runs the model as a child process: one JSON array in on stdin, one JSON
/// array out on stdout.
#[derive(Debug, Clone)]
pub struct ExternalProcessScorer {
    config: ScorerConfig,
}

impl ExternalProcessScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }
}

impl BatchScorer for ExternalProcessScorer {
    fn name(&self) -> &'static str {
        "external"
    }

    fn score_batch(&self, batch: &[FeatureVector]) -> Result<Vec<InferenceResult>, ScorerError> {
        let payload = encode_batch(batch)?;
        info!(
            program = %self.config.program,
            rows = batch.len(),
            bytes = payload.len(),
            "scorer_spawn"
        );
        let stdout = run_process(&self.config, payload)?;
        decode_predictions(&stdout, batch.len())
    }
}

/// Row as the model expects it: the 21 features in training key casing.
struct ScorerRow<'a>(&'a FeatureVector);

impl Serialize for ScorerRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_FEATURES))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.scorer_key(), &self.0.get(feature))?;
        }
        map.end()
    }
}

pub fn encode_batch(batch: &[FeatureVector]) -> Result<Vec<u8>, ScorerError> {
    let rows: Vec<ScorerRow<'_>> = batch.iter().map(ScorerRow).collect();
    serde_json::to_vec(&rows).map_err(ScorerError::Encode)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrediction {
    classification: Classification,
    risk_score: f64,
    probabilities: Probabilities,
    model_version: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Parses the model's stdout. Extra keys per object are ignored; a missing
/// timestamp is stamped with the time of receipt.
pub fn decode_predictions(
    stdout: &[u8],
    expected: usize,
) -> Result<Vec<InferenceResult>, ScorerError> {
    let wire: Vec<WirePrediction> = serde_json::from_slice(stdout).map_err(ScorerError::Parse)?;
    if wire.len() != expected {
        return Err(ScorerError::RowCount {
            expected,
            got: wire.len(),
        });
    }
    let received = Utc::now();
    Ok(wire
        .into_iter()
        .map(|w| InferenceResult {
            classification: w.classification,
            risk_score: w.risk_score,
            probabilities: w.probabilities,
            model_version: w.model_version,
            timestamp: w.timestamp.unwrap_or(received),
        })
        .collect())
}

fn run_process(config: &ScorerConfig, payload: Vec<u8>) -> Result<Vec<u8>, ScorerError> {
    // One deadline covers spawn to last byte of output.
    let deadline = Instant::now() + config.timeout;

    let mut command = Command::new(&config.program);
    command
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Own process group, so helpers the scorer forks can be killed with it.
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut command, 0);
    let mut child = command.spawn().map_err(|source| ScorerError::Spawn {
        program: config.program.clone(),
        source,
    })?;

    // Pipes are drained on their own threads so a large batch cannot
    // deadlock against a full stdout buffer.
    let writer = child.stdin.take().map(|mut stdin| {
        spawn_worker(move || {
            stdin.write_all(&payload)?;
            stdin.flush()
        })
    });
    let stdout = child.stdout.take().map(|pipe| spawn_worker(move || read_all(pipe)));
    let stderr = child.stderr.take().map(|pipe| spawn_worker(move || read_all(pipe)));

    let timed_out = |child: &mut Child| {
        terminate(child);
        ScorerError::Timeout(config.timeout)
    };

    let status = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => return Err(timed_out(&mut child)),
        Err(err) => {
            terminate(&mut child);
            return Err(ScorerError::Output(err));
        }
    };
    debug!(status = %status, "scorer_exited");

    // A forked helper may still hold the pipes open after the scorer exits.
    let stderr_bytes = match recv_until(stderr.as_ref(), deadline) {
        Some(bytes) => bytes.unwrap_or_default(),
        None => return Err(timed_out(&mut child)),
    };
    if !status.success() {
        let stderr_text = String::from_utf8_lossy(&stderr_bytes);
        return Err(ScorerError::Exit {
            status: status.to_string(),
            stderr: truncate(stderr_text.trim(), STDERR_LOG_LIMIT),
        });
    }

    match recv_until(writer.as_ref(), deadline) {
        Some(written) => written.map_err(ScorerError::Stdin)?,
        None => return Err(timed_out(&mut child)),
    }

    match recv_until(stdout.as_ref(), deadline) {
        Some(bytes) => bytes.map_err(ScorerError::Output),
        None => Err(timed_out(&mut child)),
    }
}

/// Polls the child until it exits. `Ok(None)` means the deadline passed first.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills the scorer and everything in its process group, then reaps it.
/// Closing the group's pipes lets the worker threads finish.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(err) = killed {
            warn!(error = %err, "scorer_group_kill_failed");
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_worker<T, F>(work: F) -> Receiver<std::io::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::spawn(move || {
        // The receiver is gone once the call has given up.
        let _ = tx.send(work());
    });
    rx
}

fn read_all(mut pipe: impl Read) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Result of a pipe worker, or `None` once the deadline has passed. A missing
/// pipe yields the default value.
fn recv_until<T: Default>(
    worker: Option<&Receiver<std::io::Result<T>>>,
    deadline: Instant,
) -> Option<std::io::Result<T>> {
    let Some(rx) = worker else {
        return Some(Ok(T::default()));
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => {
            Some(Err(std::io::Error::other("pipe worker panicked")))
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
