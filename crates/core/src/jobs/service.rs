//! Job poller - the start → poll → complete cycle shared by every
//! long-running operation.

use std::sync::Arc;
use std::time::Duration;

use pingintel_domain::constants::{
    BULK_ENHANCE_POLL_INTERVAL_MS, REOUTPUT_POLL_INTERVAL_MS, SOV_POLL_INTERVAL_MS,
    TRANSIENT_RETRY_DELAY_MS,
};
use pingintel_domain::{
    Job, JobInput, JobKind, JobOptions, JobResult, JobSnapshot, PingError, Result,
};
use tracing::{debug, info, warn};

use super::ports::{JobBackend, PollClock, SystemClock};

/// How often to poll and how long to wait in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits until the job is terminal.
    pub timeout: Option<Duration>,
    /// Pause before the single retry of a transient status fetch failure.
    pub transient_retry_delay: Duration,
}

impl PollPolicy {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            transient_retry_delay: Duration::from_millis(TRANSIENT_RETRY_DELAY_MS),
        }
    }

    /// Product default for the given job kind.
    pub fn for_kind(kind: JobKind) -> Self {
        let interval_ms = match kind {
            JobKind::ParseDocument => SOV_POLL_INTERVAL_MS,
            JobKind::BulkEnhance => BULK_ENHANCE_POLL_INTERVAL_MS,
            JobKind::RegenerateOutput | JobKind::Update => REOUTPUT_POLL_INTERVAL_MS,
        };
        Self::every(Duration::from_millis(interval_ms))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_transient_retry_delay(mut self, delay: Duration) -> Self {
        self.transient_retry_delay = delay;
        self
    }
}

/// Rejects input that cannot produce a job, before any network call.
///
/// # Errors
/// Returns [`PingError::Validation`] when the input is empty or does not fit
/// the job kind.
pub fn validate_input(kind: JobKind, input: &JobInput) -> Result<()> {
    match (kind, input) {
        (JobKind::ParseDocument, JobInput::Files(files)) => {
            if files.is_empty() {
                return Err(PingError::Validation("At least one file is required.".into()));
            }
            if files.iter().any(|file| file.filename.trim().is_empty()) {
                return Err(PingError::Validation("Every file needs a filename.".into()));
            }
            Ok(())
        }
        (JobKind::BulkEnhance, JobInput::Locations { records, sources }) => {
            if records.is_empty() {
                return Err(PingError::Validation("At least one location is required.".into()));
            }
            if sources.is_empty() {
                return Err(PingError::Validation("At least one data source is required.".into()));
            }
            if records.iter().any(|record| record.id.trim().is_empty()) {
                return Err(PingError::Validation("Every location needs an id.".into()));
            }
            Ok(())
        }
        (
            JobKind::RegenerateOutput | JobKind::Update,
            JobInput::Revision { source_id, location_files },
        ) => {
            if source_id.trim().is_empty() {
                return Err(PingError::Validation("Invalid sovid.".into()));
            }
            if location_files.iter().any(|file| file.filename.trim().is_empty()) {
                return Err(PingError::Validation("Every file needs a filename.".into()));
            }
            Ok(())
        }
        (kind, _) => Err(PingError::Validation(format!("Input does not match a {kind} job."))),
    }
}

/// Drives jobs of one backend to completion
pub struct JobPoller {
    backend: Arc<dyn JobBackend>,
    clock: Arc<dyn PollClock>,
}

impl JobPoller {
    /// Create a poller using the wall clock
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self { backend, clock: Arc::new(SystemClock) }
    }

    /// Replace the clock (tests drive time manually)
    pub fn with_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn kind(&self) -> JobKind {
        self.backend.kind()
    }

    /// Validate the input and submit the job
    pub fn start(&self, input: &JobInput, options: &JobOptions) -> Result<Job> {
        validate_input(self.kind(), input)?;
        let job = self.backend.start(input, options)?;
        info!(
            job_id = %job.id,
            kind = %job.kind,
            ack = job.message.as_deref().unwrap_or_default(),
            "Dispatched job"
        );
        Ok(job)
    }

    /// Fetch the job status once. Never sleeps.
    pub fn poll_once(&self, job_id: &str) -> Result<JobSnapshot> {
        let snapshot = self.backend.fetch_status(job_id)?;
        debug!(job_id, status = %snapshot.status(), "Polled job");
        Ok(snapshot)
    }

    /// Poll until the job is terminal or the policy's timeout elapses
    pub fn run_to_completion(&self, job: &Job, policy: &PollPolicy) -> Result<JobResult> {
        self.run_with_progress(job, policy, |_| {})
    }

    /// Same as [`JobPoller::run_to_completion`], reporting every snapshot
    pub fn run_with_progress<F>(
        &self,
        job: &Job,
        policy: &PollPolicy,
        mut on_snapshot: F,
    ) -> Result<JobResult>
    where
        F: FnMut(&JobSnapshot),
    {
        let snapshot = poll_until(
            self.clock.as_ref(),
            policy,
            &job.id,
            || self.poll_once(&job.id),
            JobSnapshot::is_terminal,
            |snapshot| {
                on_snapshot(snapshot);
                if !snapshot.is_terminal() {
                    info!(job_id = %job.id, progress = %snapshot.describe(), "Job still running");
                }
            },
        )?;
        info!(job_id = %job.id, status = %snapshot.status(), "Job finished");
        Ok(JobResult::new(job.clone(), snapshot))
    }

    /// Start a job and wait for it
    pub fn submit_and_wait(
        &self,
        input: &JobInput,
        options: &JobOptions,
        policy: &PollPolicy,
    ) -> Result<JobResult> {
        let job = self.start(input, options)?;
        self.run_to_completion(&job, policy)
    }
}

/// Fetch until `is_done` accepts a value or the policy's timeout elapses.
///
/// Waits `policy.interval` between fetches, clipping the last wait to the
/// deadline. One transient fetch failure is retried after
/// `policy.transient_retry_delay`. No fetch is issued once the deadline has
/// passed; the caller gets [`PingError::Timeout`] tagged with `id` instead.
pub fn poll_until<T, F, D, R>(
    clock: &dyn PollClock,
    policy: &PollPolicy,
    id: &str,
    mut fetch: F,
    mut is_done: D,
    mut on_each: R,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
    D: FnMut(&T) -> bool,
    R: FnMut(&T),
{
    let started = clock.now();
    let remaining = || {
        policy.timeout.map(|timeout| {
            timeout.saturating_sub(clock.now().saturating_duration_since(started))
        })
    };
    let timed_out = |polls: u32| {
        let elapsed = clock.now().saturating_duration_since(started);
        warn!(id, elapsed = ?elapsed, polls, "Gave up waiting");
        PingError::Timeout { job_id: id.to_string(), elapsed }
    };
    let mut polls = 0_u32;

    loop {
        let value = match fetch() {
            Err(err) if err.is_transient() => {
                warn!(
                    id,
                    error = %err,
                    retry_in = ?policy.transient_retry_delay,
                    "Transient failure while polling, retrying once"
                );
                match remaining() {
                    Some(left) if policy.transient_retry_delay >= left => {
                        clock.sleep(left);
                        return Err(timed_out(polls + 1));
                    }
                    _ => clock.sleep(policy.transient_retry_delay),
                }
                fetch()?
            }
            other => other?,
        };
        polls += 1;
        on_each(&value);
        if is_done(&value) {
            debug!(id, polls, "Polling finished");
            return Ok(value);
        }

        let wait = match remaining() {
            Some(left) if left.is_zero() => return Err(timed_out(polls)),
            Some(left) => policy.interval.min(left),
            None => policy.interval,
        };
        clock.sleep(wait);
        if remaining().is_some_and(|left| left.is_zero()) {
            return Err(timed_out(polls));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    use pingintel_domain::{JobStatus, JobStatusResponse, LocationRecord, UploadFile};
    use serde_json::json;

    use super::*;

    /// Clock that only advances when slept on
    struct ManualClock {
        base: Instant,
        offset: Mutex<Duration>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl PollClock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) {
            *self.offset.lock().unwrap() += duration;
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    /// Backend replaying scripted status responses; the last one repeats
    struct ScriptedBackend {
        kind: JobKind,
        script: Mutex<VecDeque<Result<JobSnapshot>>>,
        last: Mutex<Option<JobSnapshot>>,
        polls: Mutex<u32>,
        starts: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(kind: JobKind, script: Vec<Result<JobSnapshot>>) -> Self {
            Self {
                kind,
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                polls: Mutex::new(0),
                starts: Mutex::new(0),
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }

        fn starts(&self) -> u32 {
            *self.starts.lock().unwrap()
        }
    }

    impl JobBackend for ScriptedBackend {
        fn kind(&self) -> JobKind {
            self.kind
        }

        fn start(&self, _input: &JobInput, _options: &JobOptions) -> Result<Job> {
            *self.starts.lock().unwrap() += 1;
            Ok(Job { id: "sov-1".into(), kind: self.kind, message: Some("queued".into()) })
        }

        fn fetch_status(&self, _job_id: &str) -> Result<JobSnapshot> {
            *self.polls.lock().unwrap() += 1;
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(snapshot)) => {
                    *self.last.lock().unwrap() = Some(snapshot.clone());
                    Ok(snapshot)
                }
                Some(Err(err)) => Err(err),
                None => self.last.lock().unwrap().clone().ok_or_else(|| {
                    PingError::InvalidResponse("script exhausted".into())
                }),
            }
        }
    }

    fn snapshot(value: serde_json::Value) -> Result<JobSnapshot> {
        let response: JobStatusResponse = serde_json::from_value(value).unwrap();
        JobSnapshot::from_response("sov-1", response)
    }

    fn in_progress(pct: u32) -> Result<JobSnapshot> {
        snapshot(json!({"request": {"status": "IN_PROGRESS", "pct_complete": pct}}))
    }

    fn complete() -> Result<JobSnapshot> {
        snapshot(json!({
            "request": {"status": "COMPLETE", "pct_complete": 100},
            "result": {
                "status": "SUCCESS",
                "message": "done",
                "outputs": [
                    {"url": "/o/a.json", "filename": "a.json", "description": "JSON"},
                    {"url": "/o/b.xlsx", "filename": "b.xlsx", "description": "Excel"}
                ]
            }
        }))
    }

    fn job() -> Job {
        Job { id: "sov-1".into(), kind: JobKind::ParseDocument, message: None }
    }

    fn poller(backend: &Arc<ScriptedBackend>, clock: &Arc<ManualClock>) -> JobPoller {
        JobPoller::new(backend.clone()).with_clock(clock.clone())
    }

    fn files() -> JobInput {
        JobInput::Files(vec![UploadFile::new("test_sov.xlsx", b"PK".to_vec())])
    }

    #[test]
    fn pending_progress_complete_sleeps_between_checks() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![snapshot(json!({"request": {"status": "PENDING"}})), in_progress(50), complete()],
        ));
        let clock = Arc::new(ManualClock::new());
        let policy = PollPolicy::every(Duration::from_millis(2_500));

        let mut seen = Vec::new();
        let result = poller(&backend, &clock)
            .run_with_progress(&job(), &policy, |s| seen.push(s.status()))
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.outputs().len(), 2);
        assert_eq!(seen, vec![JobStatus::Pending, JobStatus::InProgress, JobStatus::Complete]);
        assert_eq!(backend.polls(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(2_500); 2]);
    }

    #[test]
    fn immediate_completion_never_sleeps() {
        let backend = Arc::new(ScriptedBackend::new(JobKind::ParseDocument, vec![complete()]));
        let clock = Arc::new(ManualClock::new());

        let result = poller(&backend, &clock)
            .run_to_completion(&job(), &PollPolicy::for_kind(JobKind::ParseDocument))
            .unwrap();

        assert!(result.is_success());
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn timeout_issues_no_poll_after_deadline() {
        let backend =
            Arc::new(ScriptedBackend::new(JobKind::ParseDocument, vec![in_progress(10)]));
        let clock = Arc::new(ManualClock::new());
        let policy = PollPolicy::every(Duration::from_secs(1))
            .with_timeout(Some(Duration::from_millis(3_500)));

        let err = poller(&backend, &clock).run_to_completion(&job(), &policy).unwrap_err();

        assert_eq!(
            err,
            PingError::Timeout { job_id: "sov-1".into(), elapsed: Duration::from_millis(3_500) }
        );
        // Polls at 0s, 1s, 2s and 3s; the last wait is clipped to the deadline.
        assert_eq!(backend.polls(), 4);
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(1),
                Duration::from_secs(1),
                Duration::from_millis(500),
            ]
        );
    }

    #[test]
    fn poll_once_on_terminal_job_is_idempotent() {
        let backend = Arc::new(ScriptedBackend::new(JobKind::ParseDocument, vec![complete()]));
        let clock = Arc::new(ManualClock::new());
        let poller = poller(&backend, &clock);

        let first = poller.poll_once("sov-1").unwrap();
        let second = poller.poll_once("sov-1").unwrap();

        assert_eq!(first, second);
        assert!(first.is_terminal());
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn transient_poll_failure_is_retried_once() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![Err(PingError::Transport { status: 503, body: "busy".into() }), complete()],
        ));
        let clock = Arc::new(ManualClock::new());
        let policy = PollPolicy::every(Duration::from_secs(1));

        let result = poller(&backend, &clock).run_to_completion(&job(), &policy).unwrap();

        assert!(result.is_success());
        assert_eq!(backend.polls(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn transient_retry_never_polls_past_deadline() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![
                in_progress(10),
                Err(PingError::Transport { status: 503, body: "busy".into() }),
                in_progress(20),
            ],
        ));
        let clock = Arc::new(ManualClock::new());
        let policy = PollPolicy::every(Duration::from_millis(900))
            .with_timeout(Some(Duration::from_secs(1)));

        let err = poller(&backend, &clock).run_to_completion(&job(), &policy).unwrap_err();

        assert_eq!(
            err,
            PingError::Timeout { job_id: "sov-1".into(), elapsed: Duration::from_secs(1) }
        );
        // Polls at 0ms and 900ms; the 250ms retry pause is clipped to the deadline.
        assert_eq!(backend.polls(), 2);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(900), Duration::from_millis(100)]);
    }

    #[test]
    fn poll_until_clips_last_wait_to_deadline() {
        let clock = ManualClock::new();
        let policy = PollPolicy::every(Duration::from_secs(1))
            .with_timeout(Some(Duration::from_millis(2_500)));
        let mut fetches = 0;

        let err = poll_until(
            &clock,
            &policy,
            "p-1",
            || {
                fetches += 1;
                Ok(fetches)
            },
            |_| false,
            |_| {},
        )
        .unwrap_err();

        assert_eq!(
            err,
            PingError::Timeout { job_id: "p-1".into(), elapsed: Duration::from_millis(2_500) }
        );
        assert_eq!(fetches, 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(1), Duration::from_millis(500)]
        );
    }

    #[test]
    fn second_transient_failure_surfaces() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![
                Err(PingError::Network("reset".into())),
                Err(PingError::Network("reset again".into())),
            ],
        ));
        let clock = Arc::new(ManualClock::new());

        let err = poller(&backend, &clock)
            .run_to_completion(&job(), &PollPolicy::every(Duration::from_secs(1)))
            .unwrap_err();

        assert_eq!(err, PingError::Network("reset again".into()));
        assert_eq!(backend.polls(), 2);
    }

    #[test]
    fn non_transient_poll_failure_is_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![Err(PingError::Transport { status: 404, body: "missing".into() })],
        ));
        let clock = Arc::new(ManualClock::new());

        let err = poller(&backend, &clock)
            .run_to_completion(&job(), &PollPolicy::every(Duration::from_secs(1)))
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(backend.polls(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn failed_job_is_a_result_not_an_error() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![snapshot(json!({
                "request": {"status": "COMPLETE"},
                "result": {"status": "FAILED_TO_READ", "message": "corrupt", "outputs": []}
            }))],
        ));
        let clock = Arc::new(ManualClock::new());

        let result = poller(&backend, &clock)
            .run_to_completion(&job(), &PollPolicy::every(Duration::from_secs(1)))
            .unwrap();

        assert!(!result.is_success());
        assert!(matches!(result.into_success(), Err(PingError::JobFailed { .. })));
    }

    #[test]
    fn start_validates_before_calling_backend() {
        let backend = Arc::new(ScriptedBackend::new(JobKind::ParseDocument, vec![]));
        let clock = Arc::new(ManualClock::new());
        let poller = poller(&backend, &clock);

        let err = poller.start(&JobInput::Files(vec![]), &JobOptions::default()).unwrap_err();
        assert!(matches!(err, PingError::Validation(_)));
        assert_eq!(backend.starts(), 0);

        let job = poller.start(&files(), &JobOptions::default()).unwrap();
        assert_eq!(job.id, "sov-1");
        assert_eq!(backend.starts(), 1);
    }

    #[test]
    fn validation_rules_per_kind() {
        let no_locations = JobInput::Locations { records: vec![], sources: vec![] };
        assert!(validate_input(JobKind::BulkEnhance, &no_locations).is_err());

        let no_sources = JobInput::Locations {
            records: vec![LocationRecord::with_address("item-1", "123 main st")],
            sources: vec![],
        };
        assert!(validate_input(JobKind::BulkEnhance, &no_sources).is_err());

        let revision = JobInput::Revision { source_id: String::new(), location_files: vec![] };
        assert!(validate_input(JobKind::RegenerateOutput, &revision).is_err());

        assert!(validate_input(JobKind::BulkEnhance, &files()).is_err());
        assert!(validate_input(JobKind::ParseDocument, &files()).is_ok());
    }

    #[test]
    fn submit_and_wait_runs_full_cycle() {
        let backend = Arc::new(ScriptedBackend::new(
            JobKind::ParseDocument,
            vec![in_progress(50), complete()],
        ));
        let clock = Arc::new(ManualClock::new());

        let policy = PollPolicy::every(Duration::from_secs(2));

        let result = poller(&backend, &clock)
            .submit_and_wait(&files(), &JobOptions::default(), &policy)
            .unwrap();

        assert_eq!(result.job.id, "sov-1");
        assert_eq!(backend.starts(), 1);
        assert_eq!(backend.polls(), 2);
    }
}
