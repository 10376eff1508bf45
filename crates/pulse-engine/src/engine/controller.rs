use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rand::Rng;
use reqwest::Client;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use pulse_common::EngineConfig;

use crate::engine::devices;
use crate::engine::executor::{self, CallOutcome};
use crate::error::EngineError;
use crate::metrics;
use crate::parser::link::extract_subject_id;

/// Aggregate state of one run. Every run gets its own instance and every
/// in-flight call holds the `Arc` of the run that spawned it, so a late
/// settlement from a stopped run can only ever touch the dead run's counters,
/// never a successor's.
pub struct RunState {
    running: AtomicBool,
    target_count: u64,
    subject_id: String,
    started_at: u64,
    total_requests: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    // Observational only, written by the rate sampler; fixed-point x10.
    rps_x10: AtomicU64,
    rpm_x10: AtomicU64,
}

impl RunState {
    fn new(target_count: u64, subject_id: String) -> Self {
        Self {
            running: AtomicBool::new(true),
            target_count,
            subject_id,
            started_at: unix_seconds(),
            total_requests: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            rps_x10: AtomicU64::new(0),
            rpm_x10: AtomicU64::new(0),
        }
    }

    /// Pre-start placeholder so `status` and `stop` are safe before any run.
    fn idle() -> Self {
        Self {
            running: AtomicBool::new(false),
            target_count: 0,
            subject_id: String::new(),
            started_at: 0,
            total_requests: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            rps_x10: AtomicU64::new(0),
            rpm_x10: AtomicU64::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cooperative stop: the dispatch loop observes the cleared flag at its
    /// next batch boundary. Idempotent.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn target_count(&self) -> u64 {
        self.target_count
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::SeqCst)
    }

    pub fn success_count(&self) -> u64 {
        self.success_count.load(Ordering::SeqCst)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Settle one call into the counters. Total is bumped exactly once per
    /// outcome; the prometheus mirrors move in lockstep.
    pub fn record(&self, outcome: CallOutcome) {
        self.total_requests.fetch_add(1, Ordering::SeqCst);
        metrics::REQUESTS_TOTAL.inc();

        match outcome {
            CallOutcome::Success => {
                self.success_count.fetch_add(1, Ordering::SeqCst);
                metrics::SUCCESS_TOTAL.inc();
            }
            CallOutcome::FailedParse => {
                self.failure_count.fetch_add(1, Ordering::SeqCst);
                metrics::PARSE_FAILURES.inc();
            }
            CallOutcome::FailedNetwork => {
                self.failure_count.fetch_add(1, Ordering::SeqCst);
                metrics::NETWORK_FAILURES.inc();
            }
            CallOutcome::FailedTimeout => {
                self.failure_count.fetch_add(1, Ordering::SeqCst);
                metrics::TIMEOUT_FAILURES.inc();
            }
        }
    }

    fn store_rates(&self, requests_last_second: u64) {
        self.rps_x10
            .store(requests_last_second * 10, Ordering::SeqCst);
        self.rpm_x10
            .store(requests_last_second * 600, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let success = self.success_count();
        let reqs = self.total_requests();
        StatusSnapshot {
            running: self.is_running(),
            success,
            fails: self.failure_count(),
            reqs,
            target_views: self.target_count,
            subject_id: self.subject_id.clone(),
            started_at: self.started_at,
            rps: self.rps_x10.load(Ordering::SeqCst) as f64 / 10.0,
            rpm: self.rpm_x10.load(Ordering::SeqCst) as f64 / 10.0,
            success_rate: format_success_rate(success, reqs),
        }
    }
}

/// Point-in-time projection of a run, serialized as the `/status` body.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub success: u64,
    pub fails: u64,
    pub reqs: u64,
    #[serde(rename = "targetViews")]
    pub target_views: u64,
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: u64,
    pub rps: f64,
    pub rpm: f64,
    #[serde(rename = "successRate")]
    pub success_rate: String,
}

/// `0%` for an untouched run, otherwise one decimal place.
pub fn format_success_rate(success: u64, total: u64) -> String {
    if total == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", success as f64 / total as f64 * 100.0)
    }
}

/// Echo of an accepted start command.
#[derive(Debug, Clone)]
pub struct StartAck {
    pub target: u64,
    pub subject_id: String,
}

/// Owns the one active run and drives its dispatch loop. All external access
/// to run state goes through here; nothing else holds a writable handle.
pub struct RunController {
    config: EngineConfig,
    devices_path: PathBuf,
    client: Client,
    current: Mutex<Arc<RunState>>,
}

impl RunController {
    pub fn new(config: EngineConfig, devices_path: PathBuf) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            config,
            devices_path,
            client,
            current: Mutex::new(Arc::new(RunState::idle())),
        })
    }

    /// Accept a start command: extract the subject identifier, signal the
    /// prior run to stop, install a fresh run state and spawn its dispatch
    /// loop. Returns immediately; the loop runs in the background.
    ///
    /// The prior run is not awaited to quiescence: its in-flight calls may
    /// overlap the new run briefly, but they settle into their own (dead)
    /// state and cannot touch the new counters.
    pub fn start(&self, target_views: Option<u64>, link: &str) -> Result<StartAck, EngineError> {
        let subject_id = extract_subject_id(link).ok_or(EngineError::InvalidSubject)?;
        let target = target_views.unwrap_or(self.config.default_target).max(1);

        let state = Arc::new(RunState::new(target, subject_id.clone()));
        {
            let mut current = self.current.lock();
            current.request_stop();
            *current = Arc::clone(&state);
        }

        info!(subject_id = %subject_id, target, "Run accepted");
        self.spawn_dispatch(state);

        Ok(StartAck { target, subject_id })
    }

    /// Idempotent; a no-op when no run is active.
    pub fn stop(&self) {
        self.current.lock().request_stop();
    }

    pub fn status(&self) -> StatusSnapshot {
        self.current.lock().snapshot()
    }

    /// Handle to the currently installed run state.
    pub fn current_state(&self) -> Arc<RunState> {
        Arc::clone(&self.current.lock())
    }

    fn spawn_dispatch(&self, state: Arc<RunState>) {
        let client = self.client.clone();
        let config = self.config.clone();
        let devices_path = self.devices_path.clone();
        tokio::spawn(async move {
            run_dispatch_loop(client, config, devices_path, state).await;
        });
    }
}

/// The core loop: sample a batch, dispatch it concurrently, wait for every
/// call in it to settle, pause, repeat. Exits when the target is reached, the
/// pool is empty, or a stop is observed; at most the in-flight batch finishes
/// after a stop request.
async fn run_dispatch_loop(
    client: Client,
    config: EngineConfig,
    devices_path: PathBuf,
    state: Arc<RunState>,
) {
    let devices = match devices::load_devices(&devices_path) {
        Ok(devices) => devices,
        Err(e) => {
            warn!(path = %devices_path.display(), error = %e, "Device source unavailable");
            Vec::new()
        }
    };

    if devices.is_empty() {
        warn!("No devices loaded; run ends with zero activity");
        state.request_stop();
        return;
    }

    info!(
        devices = devices.len(),
        target = state.target_count(),
        subject_id = %state.subject_id(),
        "Dispatch loop starting"
    );
    metrics::RUN_ACTIVE.set(1.0);

    let sampler_state = Arc::clone(&state);
    let sampler = tokio::spawn(async move {
        run_rate_sampler(sampler_state).await;
    });

    let batch_size = config.concurrency.min(devices.len());
    let pause = Duration::from_millis(config.batch_pause_ms);

    while state.is_running() && state.success_count() < state.target_count() {
        let mut batch = JoinSet::new();
        {
            // Uniform sampling with replacement; duplicates within a batch
            // are expected.
            let mut rng = rand::thread_rng();
            for _ in 0..batch_size {
                let identity = devices[rng.gen_range(0..devices.len())].clone();
                let client = client.clone();
                let endpoint = config.endpoint.clone();
                let run = Arc::clone(&state);
                batch.spawn(async move {
                    executor::execute(&client, &endpoint, &identity, run.subject_id(), &run).await;
                });
            }
        }

        // Settle barrier: no new batch until every call here has finished.
        while batch.join_next().await.is_some() {}

        tokio::time::sleep(pause).await;
    }

    state.request_stop();
    let _ = sampler.await;
    metrics::RUN_ACTIVE.set(0.0);

    let finished = state.snapshot();
    info!(
        success = finished.success,
        fails = finished.fails,
        success_rate = %finished.success_rate,
        "Dispatch loop stopped"
    );
}

/// Once-a-second observer: derives rps/rpm from the request-count delta and
/// logs progress. Exits with the run; has no effect on dispatch.
async fn run_rate_sampler(state: Arc<RunState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;
    let mut last_total = state.total_requests();

    while state.is_running() {
        interval.tick().await;
        let total = state.total_requests();
        state.store_rates(total.saturating_sub(last_total));
        last_total = total;

        let progress = state.snapshot();
        info!(
            success = progress.success,
            target = progress.target_views,
            success_rate = %progress.success_rate,
            rps = progress.rps,
            "Run progress"
        );
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
