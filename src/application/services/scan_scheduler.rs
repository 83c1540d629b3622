use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{
    BlobStore, JobRepository, MetricsCollector, RepositoryError, ScanChecker,
};
use crate::domain::{JobId, JobStatus, UploadJob};

use super::scan_worker::{ScanWorker, WorkOutcome};

pub const DEFAULT_WORKER_COUNT: usize = 5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Floor for the poll interval; a zero period would spin the ticker.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub worker_count: usize,
    /// A `Scanning` job untouched for longer than this is re-dispatched.
    pub stuck_job_timeout: Duration,
    pub poll_interval: Duration,
    pub queue_capacity: usize,
}

impl SchedulerConfig {
    pub fn new(stuck_job_timeout: Duration) -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            stuck_job_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

type JobReceiver = Arc<Mutex<mpsc::Receiver<UploadJob>>>;
/// Jobs sitting in the queue or held by a worker, so a job is queued once
/// per process no matter how many ticks see it.
type InFlight = Arc<Mutex<HashSet<JobId>>>;

/// Cloneable view of whether the scheduler loop is up.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus(Arc<AtomicBool>);

impl SchedulerStatus {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn mark_running(&self) -> RunningGuard {
        self.0.store(true, Ordering::SeqCst);
        RunningGuard(self.clone())
    }
}

/// Flips the status back to stopped when `start` returns or unwinds.
struct RunningGuard(SchedulerStatus);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

/// Background scheduler that drives every scan-pending upload to a terminal
/// status.
///
/// A ticker polls the job store for `ScanPending` jobs and for `Scanning` jobs
/// whose lease (`updated_at`) has expired, and feeds them through a bounded
/// queue to a fixed pool of workers. Dispatch is at-least-once.
pub struct ScanScheduler {
    job_repository: Arc<dyn JobRepository>,
    worker: ScanWorker,
    config: SchedulerConfig,
    in_flight: InFlight,
    status: SchedulerStatus,
}

impl ScanScheduler {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        blob_store: Arc<dyn BlobStore>,
        scan_checker: Arc<dyn ScanChecker>,
        metrics: Arc<dyn MetricsCollector>,
        config: SchedulerConfig,
    ) -> Self {
        let worker = ScanWorker::new(
            Arc::clone(&job_repository),
            blob_store,
            scan_checker,
            metrics,
            config.stuck_job_timeout,
        );
        Self {
            job_repository,
            worker,
            config,
            in_flight: Arc::default(),
            status: SchedulerStatus::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.clone()
    }

    /// Runs until `shutdown` fires, then closes the queue and waits for the
    /// workers to drain it.
    pub async fn start(self, shutdown: CancellationToken) {
        let _running = self.status.mark_running();
        let worker_count = self.config.worker_count.max(1);
        let poll_interval = self.config.poll_interval.max(MIN_POLL_INTERVAL);
        let (sender, receiver) = mpsc::channel(self.config.queue_capacity.max(1));
        let receiver: JobReceiver = Arc::new(Mutex::new(receiver));

        let workers: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|index| {
                tokio::spawn(run_worker(
                    index,
                    self.worker.clone(),
                    Arc::clone(&receiver),
                    Arc::clone(&self.in_flight),
                ))
            })
            .collect();

        tracing::info!(
            worker_count,
            stuck_job_timeout_ms = self.config.stuck_job_timeout.as_millis() as u64,
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Scan scheduler started"
        );

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.enqueue_actionable_jobs(&sender, &shutdown).await {
                        Ok(0) => {}
                        Ok(queued) => tracing::debug!(queued, "Queued scan jobs"),
                        Err(e) => tracing::error!(
                            error = %e,
                            "Failed to queue pending and stuck jobs"
                        ),
                    }
                }
            }
        }

        tracing::info!("Scan scheduler stopping, draining queued jobs");
        drop(sender);

        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Scan worker terminated abnormally");
            }
        }

        tracing::info!("Scan scheduler stopped");
    }

    /// Jobs the scheduler should dispatch as of `now`: every `ScanPending`
    /// job, and every `Scanning` job whose last update is older than the
    /// stuck-job timeout.
    pub async fn discover(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<UploadJob>, RepositoryError> {
        let mut jobs = self
            .job_repository
            .get_by_status(JobStatus::ScanPending)
            .await?;

        let scanning = self
            .job_repository
            .get_by_status(JobStatus::Scanning)
            .await?;

        for job in scanning {
            if job.is_stuck(now, self.config.stuck_job_timeout) {
                tracing::warn!(
                    job_id = %job.id,
                    updated_at = %job.updated_at.to_rfc3339(),
                    "Re-dispatching stuck scan job"
                );
                jobs.push(job);
            }
        }

        Ok(jobs)
    }

    async fn enqueue_actionable_jobs(
        &self,
        sender: &mpsc::Sender<UploadJob>,
        shutdown: &CancellationToken,
    ) -> Result<usize, SchedulerError> {
        let jobs = self.discover(Utc::now()).await?;

        let mut queued = 0;
        for job in jobs {
            if !self.in_flight.lock().await.insert(job.id) {
                continue;
            }
            let job_id = job.id;

            // A full queue holds the poll loop here until a worker frees a slot.
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    self.in_flight.lock().await.remove(&job_id);
                    break;
                }
                sent = sender.send(job) => {
                    if sent.is_err() {
                        self.in_flight.lock().await.remove(&job_id);
                        return Err(SchedulerError::QueueClosed);
                    }
                    queued += 1;
                }
            }
        }

        Ok(queued)
    }
}

async fn run_worker(
    index: usize,
    worker: ScanWorker,
    receiver: JobReceiver,
    in_flight: InFlight,
) {
    tracing::debug!(worker = index, "Scan worker started");

    loop {
        let next = receiver.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let job_id = job.id;
        let span = tracing::info_span!(
            "scan_job",
            worker = index,
            job_id = %job.id,
            file_id = job.file_id.as_ref().map(|id| id.as_str()).unwrap_or_default()
        );

        // A panicking job must not take the worker or its in-flight slot with it.
        let result = AssertUnwindSafe(worker.process(job).instrument(span.clone()))
            .catch_unwind()
            .await;
        in_flight.lock().await.remove(&job_id);

        match result {
            Ok(Ok(WorkOutcome::Finished(status))) => {
                span.in_scope(|| tracing::info!(status = %status, "Scan job finished"));
            }
            Ok(Ok(WorkOutcome::Skipped(_))) | Ok(Ok(WorkOutcome::Missing)) => {}
            Ok(Err(e)) => {
                span.in_scope(|| tracing::error!(error = %e, "Scan job processing failed"));
            }
            Err(panic) => {
                let message = panic_message(&*panic);
                span.in_scope(|| {
                    tracing::error!(panic = %message, "Scan job panicked, lease left to expire")
                });
            }
        }
    }

    tracing::debug!(worker = index, "Scan worker stopped: queue closed");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] RepositoryError),
    #[error("work queue closed")]
    QueueClosed,
}
