//! Periodic refresh of a remote resource into the snapshot cache.
//!
//! A poller runs one fetch per cycle and waits `interval` after each cycle
//! completes before starting the next, so cycles never overlap. It can be
//! paused, resumed and stopped through its [`PollHandle`]; dropping the
//! handle stops it too.

mod source;

pub use source::{DeployListSource, ServiceSource};

use crate::error::LaunchpadResult;
use crate::sync::{Applied, Snapshot, SnapshotCache, SnapshotList};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Data returned by one fetch
#[derive(Debug, Clone)]
pub enum Fetched {
    Entity(Value),
    List(Vec<Value>),
}

/// Something that can be fetched repeatedly
#[async_trait]
pub trait PollSource: Send + Sync {
    /// Cache key of the fetched resource
    fn resource(&self) -> String;

    async fn fetch(&self) -> LaunchpadResult<Fetched>;
}

/// New cached value produced by a cycle
#[derive(Debug, Clone)]
pub enum Update {
    Entity(Snapshot),
    List(SnapshotList),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    SignedOut,
}

/// Outcome of a cycle, or the end of polling
#[derive(Debug, Clone)]
pub enum PollEvent {
    Updated(Update),
    Unchanged,
    Failed(String),
    Stopped(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Running,
    Paused,
    Stopped,
}

pub struct Poller;

impl Poller {
    /// Start polling `source` every `interval`; the first cycle runs at once
    pub fn spawn(
        source: Arc<dyn PollSource>,
        cache: Arc<Mutex<SnapshotCache>>,
        interval: Duration,
    ) -> PollHandle {
        let (control_tx, control_rx) = watch::channel(Control::Running);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(source, cache, interval, control_rx, events_tx));
        PollHandle {
            control: control_tx,
            events: events_rx,
            task,
        }
    }
}

/// Controls a running poller and receives its events
pub struct PollHandle {
    control: watch::Sender<Control>,
    events: mpsc::UnboundedReceiver<PollEvent>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// No new cycle starts until [`resume`](Self::resume)
    pub fn pause(&self) {
        self.set(Control::Paused);
    }

    /// Continue polling, starting with an immediate cycle
    pub fn resume(&self) {
        self.set(Control::Running);
    }

    pub fn is_paused(&self) -> bool {
        *self.control.borrow() == Control::Paused
    }

    /// Next event; `None` once the poller has finished and all events are read
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Stop polling and wait for the task to finish
    pub async fn stop(self) {
        self.set(Control::Stopped);
        if let Err(e) = self.task.await {
            warn!("Poller task ended abnormally: {}", e);
        }
    }

    fn set(&self, next: Control) {
        self.control.send_if_modified(|current| {
            if *current == Control::Stopped || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

async fn run(
    source: Arc<dyn PollSource>,
    cache: Arc<Mutex<SnapshotCache>>,
    interval: Duration,
    mut control: watch::Receiver<Control>,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let resource = source.resource();
    debug!(resource = %resource, ?interval, "Poller started");

    let reason = loop {
        let state = *control.borrow_and_update();
        match state {
            Control::Stopped => break StopReason::Requested,
            Control::Paused => {
                if control.changed().await.is_err() {
                    break StopReason::Requested;
                }
                continue;
            }
            Control::Running => {}
        }

        let outcome = tokio::select! {
            outcome = cycle(source.as_ref(), &cache) => outcome,
            _ = stopped(&mut control) => break StopReason::Requested,
        };

        let event = match outcome {
            Ok(event) => event,
            Err(e) if e.is_auth_failure() => {
                warn!(resource = %resource, "Polling stopped: {}", e);
                break StopReason::SignedOut;
            }
            Err(e) => {
                debug!(resource = %resource, "Poll failed: {}", e);
                PollEvent::Failed(e.to_string())
            }
        };
        let _ = events.send(event);

        if *control.borrow() != Control::Running {
            continue;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = control.changed() => {
                if changed.is_err() {
                    break StopReason::Requested;
                }
            }
        }
    };

    debug!(resource = %resource, ?reason, "Poller stopped");
    let _ = events.send(PollEvent::Stopped(reason));
}

/// Resolves once the poller is told to stop or its handle is dropped
async fn stopped(control: &mut watch::Receiver<Control>) {
    loop {
        if control.changed().await.is_err() || *control.borrow() == Control::Stopped {
            return;
        }
    }
}

async fn cycle(source: &dyn PollSource, cache: &Mutex<SnapshotCache>) -> LaunchpadResult<PollEvent> {
    let resource = source.resource();
    let ticket = cache.lock().await.begin(&resource);
    let fetched = source.fetch().await?;

    let mut cache = cache.lock().await;
    let event = match fetched {
        Fetched::Entity(value) => match cache.apply_entity(&ticket, &value) {
            Applied::Changed(snapshot) => PollEvent::Updated(Update::Entity(snapshot)),
            Applied::Unchanged(_) | Applied::Stale => PollEvent::Unchanged,
        },
        Fetched::List(items) => match cache.apply_list(&ticket, &items) {
            Applied::Changed(list) => PollEvent::Updated(Update::List(list)),
            Applied::Unchanged(_) | Applied::Stale => PollEvent::Unchanged,
        },
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaunchpadError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_secs(5);

    type Step = fn() -> LaunchpadResult<Fetched>;

    /// Serves scripted responses; the last one repeats
    struct Scripted {
        calls: AtomicUsize,
        script: Vec<Step>,
    }

    impl Scripted {
        fn new(script: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PollSource for Scripted {
        fn resource(&self) -> String {
            "service:5".into()
        }

        async fn fetch(&self) -> LaunchpadResult<Fetched> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script[n.min(self.script.len() - 1)];
            step()
        }
    }

    fn running() -> LaunchpadResult<Fetched> {
        Ok(Fetched::Entity(json!({"id": 5, "status": "running"})))
    }

    fn stopped_service() -> LaunchpadResult<Fetched> {
        Ok(Fetched::Entity(json!({"id": 5, "status": "stopped"})))
    }

    fn offline() -> LaunchpadResult<Fetched> {
        Err(LaunchpadError::NetworkUnavailable("connection refused".into()))
    }

    fn expired() -> LaunchpadResult<Fetched> {
        Err(LaunchpadError::SessionExpired)
    }

    fn cache() -> Arc<Mutex<SnapshotCache>> {
        Arc::new(Mutex::new(SnapshotCache::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_updates_then_unchanged() {
        let source = Scripted::new(vec![running as Step]);
        let cache = cache();
        let mut handle = Poller::spawn(source.clone(), cache.clone(), INTERVAL);

        assert!(matches!(handle.next_event().await, Some(PollEvent::Updated(Update::Entity(_)))));
        assert!(matches!(handle.next_event().await, Some(PollEvent::Unchanged)));
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.lock().await.entity("service:5").unwrap()["status"], "running");

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn status_change_is_reported() {
        let source = Scripted::new(vec![running as Step, stopped_service]);
        let mut handle = Poller::spawn(source, cache(), INTERVAL);

        handle.next_event().await;
        match handle.next_event().await {
            Some(PollEvent::Updated(Update::Entity(snapshot))) => {
                assert_eq!(snapshot["status"], "stopped")
            }
            other => panic!("expected update, got {other:?}"),
        }
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn paused_poller_starts_no_cycle_and_resume_runs_at_once() {
        let source = Scripted::new(vec![running as Step]);
        let mut handle = Poller::spawn(source.clone(), cache(), INTERVAL);
        handle.next_event().await;

        handle.pause();
        assert!(handle.is_paused());
        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(source.calls(), 1);

        let resumed_at = tokio::time::Instant::now();
        handle.resume();
        assert!(matches!(handle.next_event().await, Some(PollEvent::Unchanged)));
        assert_eq!(source.calls(), 2);
        assert!(resumed_at.elapsed() < INTERVAL);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_and_polling_continues() {
        let source = Scripted::new(vec![offline as Step, running]);
        let mut handle = Poller::spawn(source.clone(), cache(), INTERVAL);

        assert!(matches!(handle.next_event().await, Some(PollEvent::Failed(msg)) if msg.contains("refused")));
        assert!(matches!(handle.next_event().await, Some(PollEvent::Updated(_))));
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_stops_poller() {
        let source = Scripted::new(vec![running as Step, expired]);
        let mut handle = Poller::spawn(source.clone(), cache(), INTERVAL);

        handle.next_event().await;
        assert!(matches!(
            handle.next_event().await,
            Some(PollEvent::Stopped(StopReason::SignedOut))
        ));
        assert!(handle.next_event().await.is_none());

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_polling() {
        let source = Scripted::new(vec![running as Step]);
        let mut handle = Poller::spawn(source.clone(), cache(), INTERVAL);
        handle.next_event().await;
        drop(handle);

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn list_source_reconciles_into_cache() {
        struct Deploys;

        #[async_trait]
        impl PollSource for Deploys {
            fn resource(&self) -> String {
                "service:5:deploys".into()
            }

            async fn fetch(&self) -> LaunchpadResult<Fetched> {
                Ok(Fetched::List(vec![json!({"id": 1}), json!({"id": 2})]))
            }
        }

        let cache = cache();
        let mut handle = Poller::spawn(Arc::new(Deploys), cache.clone(), INTERVAL);

        assert!(matches!(handle.next_event().await, Some(PollEvent::Updated(Update::List(l))) if l.len() == 2));
        handle.stop().await;
        assert_eq!(cache.lock().await.list("service:5:deploys").unwrap().len(), 2);
    }
}
