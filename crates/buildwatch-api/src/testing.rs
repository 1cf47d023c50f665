//! In-memory CI server and notification sink for handler and route tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use buildwatch_core::{
    CiServer, DispatchError, FetchError, Job, NotificationSink, TriggerError,
};
use tokio::sync::oneshot;

#[derive(Default)]
pub struct FakeCi {
    jobs: Vec<Job>,
    fetch_error: Option<String>,
    rejections: HashMap<String, u16>,
    unreachable: HashSet<String>,
    triggered: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    ack_probe: Mutex<Option<oneshot::Receiver<String>>>,
    ack_seen: Mutex<Option<bool>>,
}

impl FakeCi {
    pub fn with_jobs(names: &[&str]) -> Self {
        Self {
            jobs: names
                .iter()
                .map(|name| Job::new(*name, format!("https://ci.example.com/job/{}/", name)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fetch_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Answer trigger requests for `job` with `status`.
    pub fn rejecting(mut self, job: &str, status: u16) -> Self {
        self.rejections.insert(job.to_string(), status);
        self
    }

    /// Fail trigger requests for `job` at the transport level.
    pub fn unreachable(mut self, job: &str) -> Self {
        self.unreachable.insert(job.to_string());
        self
    }

    /// Record whether `ack` already holds a value when the first CI call arrives.
    pub fn probe_ack(&self, ack: oneshot::Receiver<String>) {
        *self.ack_probe.lock().unwrap() = Some(ack);
    }

    pub fn ack_seen_before_first_call(&self) -> Option<bool> {
        *self.ack_seen.lock().unwrap()
    }

    pub fn triggered(&self) -> Vec<String> {
        self.triggered.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_ack(&self) {
        let mut seen = self.ack_seen.lock().unwrap();
        if seen.is_some() {
            return;
        }
        if let Some(mut probe) = self.ack_probe.lock().unwrap().take() {
            *seen = Some(probe.try_recv().is_ok());
        }
    }
}

#[async_trait]
impl CiServer for FakeCi {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, FetchError> {
        self.check_ack();
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fetch_error {
            Some(message) => Err(FetchError::Request(message.clone())),
            None => Ok(self.jobs.clone()),
        }
    }

    async fn trigger_build(&self, job_name: &str) -> Result<(), TriggerError> {
        self.check_ack();
        if self.unreachable.contains(job_name) {
            return Err(TriggerError::Request("connection refused".to_string()));
        }
        if let Some(&status) = self.rejections.get(job_name) {
            return Err(TriggerError::Rejected { status });
        }
        self.triggered.lock().unwrap().push(job_name.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    posts: Mutex<Vec<(String, String)>>,
    reject_all: bool,
}

impl RecordingSink {
    pub fn rejecting_all() -> Self {
        Self {
            reject_all: true,
            ..Default::default()
        }
    }

    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.posts().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn post(&self, channel: &str, text: &str) -> Result<(), DispatchError> {
        if self.reject_all {
            return Err(DispatchError::Rejected("not_in_channel".to_string()));
        }
        self.posts
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
