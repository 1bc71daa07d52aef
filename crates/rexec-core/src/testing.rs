//! Recording fakes for the external seams.
use std::{
    collections::{HashSet, VecDeque},
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use rexec_model::{
    BuildEvent, BuildHandle, BuildId, BuildRequest, ExitStatus, InputBinding, JobInput, JobRef,
    OutputBinding,
};
use tokio::sync::{Notify, Semaphore};

use crate::{
    client::{BuildClient, ClientError, EventFeed},
    error::CoreError,
    render::StreamConsumer,
    transfer::{TransferError, TransferKind, TransferService},
};

pub struct FakeClient {
    pub build_id: u64,
    pub fail_create: bool,
    pub fail_abort: bool,
    pub fail_events: bool,
    pub job_inputs: Vec<JobInput>,
    /// When set, build creation blocks until notified.
    pub create_gate: Option<Arc<Notify>>,
    pub create_called: Notify,
    pub events: Mutex<Vec<Result<BuildEvent, String>>>,
    /// When set, the feed blocks after its scripted events until notified.
    pub hold_feed: Option<Arc<Notify>>,
    /// When set, abort calls block until notified.
    pub abort_gate: Option<Arc<Notify>>,
    pub created: Mutex<Vec<BuildRequest>>,
    pub aborts: AtomicUsize,
    pub abort_called: Notify,
    pub feed_closed: Arc<AtomicBool>,
}

impl FakeClient {
    pub fn new(build_id: u64) -> Self {
        Self {
            build_id,
            fail_create: false,
            fail_abort: false,
            fail_events: false,
            job_inputs: Vec::new(),
            create_gate: None,
            create_called: Notify::new(),
            events: Mutex::new(Vec::new()),
            hold_feed: None,
            abort_gate: None,
            created: Mutex::new(Vec::new()),
            aborts: AtomicUsize::new(0),
            abort_called: Notify::new(),
            feed_closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_events(self, events: Vec<BuildEvent>) -> Self {
        *self.events.lock().unwrap() = events.into_iter().map(Ok).collect();
        self
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }

    pub fn created_requests(&self) -> Vec<BuildRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildClient for FakeClient {
    async fn create_build(&self, request: &BuildRequest) -> Result<BuildHandle, ClientError> {
        self.create_called.notify_one();
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        if self.fail_create {
            return Err(ClientError::Rejected {
                status: 500,
                message: "boom".into(),
            });
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(BuildHandle::new(self.build_id))
    }

    async fn abort_build(&self, _id: BuildId) -> Result<(), ClientError> {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        self.abort_called.notify_one();
        if let Some(gate) = &self.abort_gate {
            gate.notified().await;
        }
        if self.fail_abort {
            return Err(ClientError::Transport("connection refused".into()));
        }
        Ok(())
    }

    async fn build_events(&self, _id: BuildId) -> Result<Box<dyn EventFeed>, ClientError> {
        if self.fail_events {
            return Err(ClientError::Transport("no route to host".into()));
        }
        let events = std::mem::take(&mut *self.events.lock().unwrap());
        Ok(Box::new(FakeFeed {
            events: events.into(),
            hold: self.hold_feed.clone(),
            closed: Arc::clone(&self.feed_closed),
        }))
    }

    async fn job_inputs(&self, job: &JobRef) -> Result<Vec<JobInput>, ClientError> {
        if job.job == "missing" {
            return Err(ClientError::Rejected {
                status: 404,
                message: "job not found".into(),
            });
        }
        Ok(self.job_inputs.clone())
    }
}

pub struct FakeFeed {
    pub events: VecDeque<Result<BuildEvent, String>>,
    pub hold: Option<Arc<Notify>>,
    pub closed: Arc<AtomicBool>,
}

impl FakeFeed {
    pub fn new(events: Vec<BuildEvent>) -> Self {
        Self {
            events: events.into_iter().map(Ok).collect(),
            hold: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing_after(events: Vec<BuildEvent>, error: &str) -> Self {
        let mut feed = Self::new(events);
        feed.events.push_back(Err(error.to_string()));
        feed
    }
}

#[async_trait]
impl EventFeed for FakeFeed {
    async fn next_event(&mut self) -> Result<Option<BuildEvent>, ClientError> {
        match self.events.pop_front() {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(e)) => Err(ClientError::Transport(e)),
            None => {
                if let Some(hold) = &self.hold {
                    hold.notified().await;
                }
                Ok(None)
            }
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeTransfer {
    pub log: Mutex<Vec<(TransferKind, String)>>,
    pub finished: AtomicUsize,
    pub fail: HashSet<String>,
    pub panic_on: HashSet<String>,
    /// When set, every download waits for one permit.
    pub download_gate: Option<Arc<Semaphore>>,
}

impl FakeTransfer {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            fail: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            download_gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(TransferKind, String)> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, kind: TransferKind) -> usize {
        self.calls().iter().filter(|(k, _)| *k == kind).count()
    }

    fn record(&self, kind: TransferKind, name: &str) -> Result<u64, TransferError> {
        self.log.lock().unwrap().push((kind, name.to_string()));
        if self.panic_on.contains(name) {
            panic!("transfer of {name} panicked");
        }
        if self.fail.contains(name) {
            return Err(TransferError::Transport(format!("{name}: connection reset")));
        }
        Ok(1)
    }
}

#[async_trait]
impl TransferService for FakeTransfer {
    async fn upload(
        &self,
        _build: &BuildHandle,
        input: &InputBinding,
        _source: &Path,
        _exclude_ignored: bool,
    ) -> Result<u64, TransferError> {
        let result = self.record(TransferKind::Upload, &input.name);
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn download(
        &self,
        _build: &BuildHandle,
        output: &OutputBinding,
        _dest: &Path,
    ) -> Result<u64, TransferError> {
        if let Some(gate) = &self.download_gate {
            let _permit = gate.acquire().await;
        }
        let result = self.record(TransferKind::Download, &output.name);
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Consumer that ignores the feed and reports a fixed status.
pub struct FixedStatus(pub ExitStatus);

#[async_trait]
impl StreamConsumer for FixedStatus {
    async fn consume(&mut self, _feed: &mut dyn EventFeed) -> Result<ExitStatus, CoreError> {
        Ok(self.0)
    }
}
