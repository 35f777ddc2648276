//! Periodic expiry sweep worker.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use hemobank_alerts::{AlertEngine, AlertSink};
use hemobank_inventory::{InventoryLedger, LedgerError, SweepOutcome};
use hemobank_store::UnitStore;

/// Sweep worker configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between sweep passes.
    pub interval: Duration,
    /// Name for logging and the worker thread.
    pub name: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            name: "expiry-sweep".to_string(),
        }
    }
}

impl SweepConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Handle to control a running sweep worker.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<SweepStats>>,
}

impl SweepHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }

    /// Get current worker statistics.
    pub fn stats(&self) -> SweepStats {
        self.stats.lock().unwrap().clone()
    }
}

/// Worker runtime statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SweepStats {
    pub runs: u64,
    pub failed_runs: u64,
    pub units_expired: u64,
    pub volume_expired_ml: u64,
    pub alerts_raised: u64,
}

/// What a single sweep pass did.
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub swept: SweepOutcome,
    pub alerts_raised: usize,
}

/// Background expiry sweep.
///
/// Every pass reclassifies units past their date, snapshots usable stock
/// and pushes the evaluated alerts to the sink.
pub struct SweepWorker<S> {
    ledger: InventoryLedger<S>,
    engine: AlertEngine,
    sink: Arc<dyn AlertSink>,
}

impl<S: UnitStore + 'static> SweepWorker<S> {
    pub fn new(ledger: InventoryLedger<S>, engine: AlertEngine, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            ledger,
            engine,
            sink,
        }
    }

    /// Execute a single pass (for testing or synchronous use).
    pub fn run_once(&self, as_of: NaiveDate) -> Result<SweepRun, LedgerError> {
        let swept = self.ledger.sweep_expired(as_of)?;
        let snapshot = self.ledger.snapshot(as_of)?;
        let alerts = self.engine.evaluate(&snapshot);
        for alert in &alerts {
            self.sink.emit(alert);
        }

        debug!(
            units_expired = swept.units_expired,
            volume_ml = swept.volume_ml,
            alerts = alerts.len(),
            "sweep pass complete"
        );
        Ok(SweepRun {
            swept,
            alerts_raised: alerts.len(),
        })
    }

    /// Spawn the worker in a background thread.
    pub fn spawn(self, config: SweepConfig) -> SweepHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats = Arc::new(Mutex::new(SweepStats::default()));
        let stats_clone = stats.clone();

        let name = config.name.clone();
        let join = thread::Builder::new()
            .name(name)
            .spawn(move || {
                sweep_loop(self, config, shutdown_rx, stats_clone);
            })
            .expect("failed to spawn sweep worker thread");

        SweepHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        }
    }
}

fn sweep_loop<S: UnitStore + 'static>(
    worker: SweepWorker<S>,
    config: SweepConfig,
    shutdown_rx: mpsc::Receiver<()>,
    stats: Arc<Mutex<SweepStats>>,
) {
    info!(
        worker = %config.name,
        interval_secs = config.interval.as_secs(),
        "sweep worker started"
    );

    loop {
        // Wake on shutdown immediately, or after one interval for a pass.
        match shutdown_rx.recv_timeout(config.interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        let today = Utc::now().date_naive();
        match worker.run_once(today) {
            Ok(run) => {
                let mut s = stats.lock().unwrap();
                s.runs += 1;
                s.units_expired += u64::from(run.swept.units_expired);
                s.volume_expired_ml += u64::from(run.swept.volume_ml);
                s.alerts_raised += run.alerts_raised as u64;
            }
            Err(e) => {
                warn!(worker = %config.name, error = %e, "sweep pass failed");
                let mut s = stats.lock().unwrap();
                s.runs += 1;
                s.failed_runs += 1;
            }
        }
    }

    info!(worker = %config.name, "sweep worker stopped");
}
