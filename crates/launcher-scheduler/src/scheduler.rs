//! Job scheduler: one cron timer per enabled job, at most one run per job.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use launcher_notify::NoopNotifier;
use launcher_protocols::{
    DEFAULT_TIMEOUT_MINUTES, ExecutionMode, Job, JobSpec, JobStore, JobUpdate, LogPage, LogQuery,
    Notifier, ProjectRegistry,
};
use launcher_runner::{ConfiguredTerminal, ProcessRunner, RunRequest, TerminalLauncher};

use crate::cron::CronSchedule;
use crate::error::{SchedulerError, SchedulerResult};
use crate::events::SchedulerEvent;
use crate::manual::{ManualOutcome, ManualRequest};
use crate::sink::CompletionSink;
use crate::timer::{CronTimer, SystemClock, TimerClock};

const EVENT_CAPACITY: usize = 256;
const IDLE_POLL: Duration = Duration::from_millis(50);

/// What a fire attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// A run was spawned.
    Started,
    /// Skipped: the previous run of this job is still in flight.
    AlreadyRunning,
    /// Skipped: the job is gone, disabled, or the scheduler is shut down.
    Inactive,
}

/// In-flight run of a job.
struct RunHandle {
    run_id: u64,
    cancel: CancellationToken,
}

struct SchedulerInner {
    store: Arc<dyn JobStore>,
    runner: ProcessRunner,
    terminal: Arc<dyn TerminalLauncher>,
    projects: Option<Arc<dyn ProjectRegistry>>,
    clock: Arc<dyn TimerClock>,
    sink: CompletionSink,
    timers: Mutex<HashMap<String, CronTimer>>,
    /// Held across disarm, persist and re-arm so the timer map follows the
    /// store's last write.
    mutations: tokio::sync::Mutex<()>,
    running: Mutex<HashMap<String, RunHandle>>,
    next_run_id: AtomicU64,
    /// Runs (scheduled or manual) not yet recorded by the sink.
    in_flight: AtomicUsize,
    default_timeout_minutes: u32,
    manual_timeout_minutes: u32,
    shutdown: CancellationToken,
}

/// Builder for [`JobScheduler`].
pub struct JobSchedulerBuilder {
    store: Arc<dyn JobStore>,
    runner: ProcessRunner,
    notifier: Arc<dyn Notifier>,
    terminal: Arc<dyn TerminalLauncher>,
    projects: Option<Arc<dyn ProjectRegistry>>,
    clock: Arc<dyn TimerClock>,
    default_timeout_minutes: u32,
    manual_timeout_minutes: u32,
}

impl JobSchedulerBuilder {
    pub fn runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn terminal(mut self, terminal: Arc<dyn TerminalLauncher>) -> Self {
        self.terminal = terminal;
        self
    }

    /// Restrict manual executions to registered project paths.
    pub fn projects(mut self, projects: Arc<dyn ProjectRegistry>) -> Self {
        self.projects = Some(projects);
        self
    }

    /// Replace the wall clock that drives cron timers.
    pub fn clock(mut self, clock: Arc<dyn TimerClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_timeout_minutes(mut self, minutes: u32) -> Self {
        self.default_timeout_minutes = minutes;
        self
    }

    pub fn manual_timeout_minutes(mut self, minutes: u32) -> Self {
        self.manual_timeout_minutes = minutes;
        self
    }

    pub fn build(self) -> JobScheduler {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let sink = CompletionSink::new(self.store.clone(), self.notifier, events);

        JobScheduler {
            inner: Arc::new(SchedulerInner {
                store: self.store,
                runner: self.runner,
                terminal: self.terminal,
                projects: self.projects,
                clock: self.clock,
                sink,
                timers: Mutex::new(HashMap::new()),
                mutations: tokio::sync::Mutex::new(()),
                running: Mutex::new(HashMap::new()),
                next_run_id: AtomicU64::new(1),
                in_flight: AtomicUsize::new(0),
                default_timeout_minutes: self.default_timeout_minutes,
                manual_timeout_minutes: self.manual_timeout_minutes,
                shutdown: CancellationToken::new(),
            }),
        }
    }
}

/// Owns the timers and the running-process registry for every job.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<SchedulerInner>,
}

impl JobScheduler {
    pub fn builder(store: Arc<dyn JobStore>) -> JobSchedulerBuilder {
        JobSchedulerBuilder {
            store,
            runner: ProcessRunner::default(),
            notifier: Arc::new(NoopNotifier),
            terminal: Arc::new(ConfiguredTerminal::default()),
            projects: None,
            clock: Arc::new(SystemClock),
            default_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            manual_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
        }
    }

    /// Start a timer for every enabled stored job.
    ///
    /// Jobs with an invalid expression are skipped with a warning. Returns the
    /// number of timers started.
    pub async fn initialize(&self) -> SchedulerResult<usize> {
        let jobs = self.inner.store.list_jobs().await?;
        let mut started = 0;
        for job in jobs.iter().filter(|j| j.enabled) {
            if self.inner.arm(job) {
                started += 1;
            }
        }
        info!("Scheduler initialized: {} of {} jobs scheduled", started, jobs.len());
        Ok(started)
    }

    /// Validate, persist, and schedule a new job.
    pub async fn add_job(&self, mut spec: JobSpec) -> SchedulerResult<Job> {
        let expression = spec.effective_cron().unwrap_or_default();
        let schedule = parse_schedule(&expression)?;
        let timeout = spec.timeout_minutes.unwrap_or(self.inner.default_timeout_minutes);
        check_timeout(timeout)?;

        spec.cron_expression = expression;
        spec.timeout_minutes = Some(timeout);

        let job = self.inner.store.create_job(spec).await?;
        info!("Added schedule '{}' ({})", job.id, job.cron_expression);

        if job.enabled {
            self.inner.arm_with(&job.id, schedule);
        }
        Ok(job)
    }

    /// Apply `update`, replacing the job's timer.
    pub async fn update_job(&self, id: &str, update: JobUpdate) -> SchedulerResult<Job> {
        let update = update.normalize();
        if let Some(expression) = &update.cron_expression {
            parse_schedule(expression)?;
        }
        if let Some(timeout) = update.timeout_minutes {
            check_timeout(timeout)?;
        }

        let _guard = self.inner.mutations.lock().await;
        self.inner.disarm(id);

        let job = match self.inner.store.update_job(id, update).await {
            Ok(job) => job,
            Err(e) => {
                // Put back the timer of a job that still exists.
                if let Ok(Some(job)) = self.inner.store.get_job(id).await {
                    if job.enabled {
                        self.inner.arm(&job);
                    }
                }
                return Err(e.into());
            }
        };

        if job.enabled {
            self.inner.arm(&job);
        }
        debug!("Updated schedule '{}'", id);
        Ok(job)
    }

    pub async fn toggle_job(&self, id: &str, enabled: bool) -> SchedulerResult<Job> {
        self.update_job(id, JobUpdate::enabled(enabled)).await
    }

    /// Stop the timer, cancel any in-flight run without waiting, and delete.
    pub async fn remove_job(&self, id: &str) -> SchedulerResult<bool> {
        let _guard = self.inner.mutations.lock().await;
        self.inner.disarm(id);
        self.inner.cancel_run(id);
        let removed = self.inner.store.delete_job(id).await?;
        if removed {
            info!("Removed schedule '{}'", id);
        }
        Ok(removed)
    }

    pub async fn remove_jobs_for_project(&self, project_id: &str) -> SchedulerResult<usize> {
        let _guard = self.inner.mutations.lock().await;
        let jobs = self.inner.store.list_jobs().await?;
        for job in jobs.iter().filter(|j| j.project_id == project_id) {
            self.inner.disarm(&job.id);
            self.inner.cancel_run(&job.id);
        }
        let removed = self.inner.store.delete_jobs_for_project(project_id).await?;
        info!("Removed {} schedules of project '{}'", removed, project_id);
        Ok(removed)
    }

    /// Stop every timer and cancel every in-flight process.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();

        let timers: Vec<CronTimer> = self.inner.timers.lock().drain().map(|(_, t)| t).collect();
        for timer in &timers {
            timer.cancel();
        }

        let running = self.inner.running.lock().len();
        for handle in self.inner.running.lock().values() {
            handle.cancel.cancel();
        }

        info!(
            "Scheduler shut down: {} timers stopped, {} runs cancelled",
            timers.len(),
            running
        );
    }

    /// Fire a job now through the regular fire path.
    pub async fn run_now(&self, id: &str) -> SchedulerResult<FireOutcome> {
        if self.inner.store.get_job(id).await?.is_none() {
            return Err(SchedulerError::NotFound(id.to_string()));
        }
        Ok(self.inner.fire(id).await)
    }

    /// Run a command once, outside any schedule, and record it.
    pub async fn execute_now(&self, request: ManualRequest) -> SchedulerResult<ManualOutcome> {
        if let Some(projects) = &self.inner.projects {
            if !projects.is_registered_path(&request.project_path).await {
                return Err(SchedulerError::UnregisteredProject(
                    request.project_path.clone(),
                ));
            }
        }

        let dir = Path::new(&request.project_path);
        if !dir.is_dir() {
            return Err(SchedulerError::PathMissing(request.project_path.clone()));
        }

        let minutes = request
            .timeout_minutes
            .unwrap_or(self.inner.manual_timeout_minutes);
        check_timeout(minutes)?;
        let timeout = RunRequest::minutes(minutes);

        let run = match request.mode {
            ExecutionMode::Terminal => {
                self.inner
                    .terminal
                    .invocation(dir, &request.command, timeout)?
            }
            ExecutionMode::Silent => RunRequest::shell(&request.command, dir, timeout),
        };

        info!(
            "Manual {} run in {}: {}",
            match request.mode {
                ExecutionMode::Terminal => "terminal",
                ExecutionMode::Silent => "silent",
            },
            request.project_path,
            request.command
        );

        // Detached so a dropped caller neither kills the child nor skips
        // the log.
        let inner = Arc::clone(&self.inner);
        inner.in_flight.fetch_add(1, Ordering::AcqRel);
        let task = tokio::spawn(async move {
            let result = inner
                .runner
                .run_with_cancel(run, inner.shutdown.child_token())
                .await;
            let log = inner.sink.record_manual(&request, result.clone()).await;
            inner.in_flight.fetch_sub(1, Ordering::AcqRel);
            ManualOutcome { log, result }
        });

        task.await.map_err(|e| SchedulerError::Task(e.to_string()))
    }

    pub async fn list_jobs(&self) -> SchedulerResult<Vec<Job>> {
        Ok(self.inner.store.list_jobs().await?)
    }

    pub async fn get_job(&self, id: &str) -> SchedulerResult<Job> {
        self.inner
            .store
            .get_job(id)
            .await?
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    pub async fn get_job_for_command(
        &self,
        project_id: &str,
        command_index: usize,
    ) -> SchedulerResult<Option<Job>> {
        Ok(self
            .inner
            .store
            .find_job_for_command(project_id, command_index)
            .await?)
    }

    pub async fn list_logs(&self, query: &LogQuery) -> SchedulerResult<LogPage> {
        Ok(self.inner.store.list_logs(query).await?)
    }

    pub async fn clear_logs(&self, schedule_id: Option<&str>) -> SchedulerResult<usize> {
        Ok(self.inner.store.clear_logs(schedule_id).await?)
    }

    pub fn active_timer_count(&self) -> usize {
        self.inner.timers.lock().len()
    }

    /// Expression driving the job's active timer.
    pub fn timer_expression(&self, id: &str) -> Option<String> {
        self.inner
            .timers
            .lock()
            .get(id)
            .map(|t| t.expression().to_string())
    }

    pub fn next_fire_time(&self, id: &str) -> Option<chrono::DateTime<chrono::Local>> {
        self.inner.timers.lock().get(id).and_then(CronTimer::next_fire_time)
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.inner.running.lock().contains_key(id)
    }

    pub fn running_job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.running.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.inner.sink.subscribe()
    }

    /// Wait until every scheduled and manual run has been recorded.
    /// Returns `false` on timeout.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.inner.in_flight.load(Ordering::Acquire) == 0 {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    }
}

impl SchedulerInner {
    /// Start (or replace) the job's timer. Returns `false` for an invalid
    /// stored expression.
    fn arm(self: &Arc<Self>, job: &Job) -> bool {
        match CronSchedule::parse(&job.cron_expression) {
            Ok(schedule) => {
                self.arm_with(&job.id, schedule);
                true
            }
            Err(e) => {
                warn!(
                    "Skipping schedule '{}' with invalid cron '{}': {}",
                    job.id, job.cron_expression, e
                );
                false
            }
        }
    }

    fn arm_with(self: &Arc<Self>, id: &str, schedule: CronSchedule) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let timer = CronTimer::start_with_clock(id, schedule, self.clock.clone(), move |job_id| {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.fire(&job_id).await;
                }
            }
        });

        debug!("Timer armed for '{}' ({})", id, timer.expression());
        if let Some(old) = self.timers.lock().insert(id.to_string(), timer) {
            old.cancel();
        }
    }

    fn disarm(&self, id: &str) {
        if let Some(timer) = self.timers.lock().remove(id) {
            timer.cancel();
        }
    }

    fn cancel_run(&self, id: &str) {
        if let Some(handle) = self.running.lock().get(id) {
            info!("Cancelling in-flight run of '{}'", id);
            handle.cancel.cancel();
        }
    }

    async fn fire(self: &Arc<Self>, id: &str) -> FireOutcome {
        if self.shutdown.is_cancelled() {
            return FireOutcome::Inactive;
        }
        let busy = self.running.lock().contains_key(id);
        if busy {
            debug!("Schedule '{}' still running, skipping fire", id);
            return FireOutcome::AlreadyRunning;
        }

        let job = match self.store.get_job(id).await {
            Ok(Some(job)) if job.enabled => job,
            Ok(_) => return FireOutcome::Inactive,
            Err(e) => {
                warn!("Failed to load schedule '{}' for firing: {}", id, e);
                return FireOutcome::Inactive;
            }
        };

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = self.shutdown.child_token();
        {
            let mut running = self.running.lock();
            if running.contains_key(id) {
                return FireOutcome::AlreadyRunning;
            }
            running.insert(
                id.to_string(),
                RunHandle {
                    run_id,
                    cancel: cancel.clone(),
                },
            );
        }

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.run_scheduled(job, run_id, cancel).await });
        FireOutcome::Started
    }

    async fn run_scheduled(self: Arc<Self>, job: Job, run_id: u64, cancel: CancellationToken) {
        info!("Running schedule '{}': {}", job.id, job.display_name());

        let request = RunRequest::shell(
            &job.command,
            &job.project_path,
            RunRequest::minutes(job.timeout_minutes),
        );
        let result = self.runner.run_with_cancel(request, cancel).await;

        {
            let mut running = self.running.lock();
            if running.get(&job.id).is_some_and(|h| h.run_id == run_id) {
                running.remove(&job.id);
            }
        }

        info!(
            "Schedule '{}' finished: {} in {}ms",
            job.id, result.status, result.duration_ms
        );
        self.sink.record_scheduled(&job, result).await;
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

fn parse_schedule(expression: &str) -> SchedulerResult<CronSchedule> {
    CronSchedule::parse(expression).map_err(|e| SchedulerError::invalid_schedule(expression, e))
}

fn check_timeout(minutes: u32) -> SchedulerResult<()> {
    if minutes == 0 {
        return Err(SchedulerError::InvalidTimeout(minutes));
    }
    Ok(())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
