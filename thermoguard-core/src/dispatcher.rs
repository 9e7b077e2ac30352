//! Typed Event Dispatcher
//!
//! ## Overview
//!
//! Sinks subscribe to the event kinds they care about and receive nothing
//! else: a persistence adapter can take averages and alerts while a console
//! view also takes raw samples.
//!
//! ```text
//!                    ┌─▶ Sample  ─▶ [console]
//! publish(event) ────┼─▶ Average ─▶ [console, storage]
//!                    └─▶ Alert   ─▶ [console, storage]
//! ```
//!
//! ## Delivery Rules
//!
//! - Synchronous, in subscription order.
//! - A sink that returns an error *or panics* is logged and counted as
//!   failed; delivery continues with the next sink.
//! - The subscription list is snapshotted before delivery, so a sink may
//!   subscribe further sinks without deadlocking.
//! - Publishing never waits on a slow sink beyond its own `handle` call.
//!   Wrap slow sinks in a [`QueuedSink`] to move their work off the caller.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{mpsc, Arc, Mutex, RwLock},
    thread::JoinHandle,
};

use crate::{
    errors::SinkError,
    events::{Event, EventKind},
};

/// Consumer of pipeline events
pub trait Sink: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Process one event
    fn handle(&self, event: &Event) -> Result<(), SinkError>;
}

struct Subscription {
    kind: EventKind,
    sink: Arc<dyn Sink>,
}

/// Outcome of one publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

/// Fan-out of events to subscribed sinks
#[derive(Default)]
pub struct Dispatcher {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver events of `kind` to `sink`
    pub fn subscribe(&self, kind: EventKind, sink: Arc<dyn Sink>) {
        log::debug!("sink '{}' subscribed to {} events", sink.name(), kind.name());
        self.subscriptions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Subscription { kind, sink });
    }

    /// Deliver every kind of event to `sink`
    pub fn subscribe_all(&self, sink: Arc<dyn Sink>) {
        for kind in EventKind::ALL {
            self.subscribe(kind, Arc::clone(&sink));
        }
    }

    /// Number of sinks subscribed to `kind`
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    /// Deliver `event` to every sink subscribed to its kind
    pub fn publish(&self, event: &Event) -> Delivery {
        let kind = event.kind();
        let targets: Vec<Arc<dyn Sink>> = self
            .subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.sink))
            .collect();

        let mut report = Delivery::default();
        for sink in targets {
            if deliver(sink.as_ref(), event) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

/// Hand one event to one sink, isolating errors and panics
fn deliver(sink: &dyn Sink, event: &Event) -> bool {
    match catch_unwind(AssertUnwindSafe(|| sink.handle(event))) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            log::warn!(
                "sink '{}' failed on {} event from {}: {}",
                sink.name(),
                event.kind().name(),
                event.source_id(),
                err
            );
            false
        }
        Err(_) => {
            log::warn!(
                "sink '{}' panicked on {} event from {}",
                sink.name(),
                event.kind().name(),
                event.source_id()
            );
            false
        }
    }
}

/// Moves a slow sink onto its own worker thread
///
/// `handle` only enqueues, so the publisher never blocks on the inner sink.
/// Events are processed in publish order. [`QueuedSink::shutdown`] (also run
/// on drop) closes the queue, lets the worker drain it and joins the thread.
pub struct QueuedSink {
    name: String,
    sender: Mutex<Option<mpsc::Sender<Event>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedSink {
    pub fn spawn(inner: Arc<dyn Sink>) -> Result<Self, SinkError> {
        let name = format!("queued:{}", inner.name());
        let (sender, receiver) = mpsc::channel::<Event>();

        let worker = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                for event in receiver {
                    deliver(inner.as_ref(), &event);
                }
            })
            .map_err(SinkError::failed)?;

        Ok(Self {
            name,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Stop accepting events, drain the queue and join the worker
    pub fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                log::warn!("worker of sink '{}' terminated abnormally", self.name);
            }
        }
    }
}

impl Sink for QueuedSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &Event) -> Result<(), SinkError> {
        let guard = self.sender.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(sender) => sender.send(event.clone()).map_err(|_| SinkError::Closed),
            None => Err(SinkError::Closed),
        }
    }
}

impl Drop for QueuedSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::Reading, quantity::Quantity};
    use chrono::NaiveDate;

    struct Recorder {
        name: &'static str,
        seen: Mutex<Vec<String>>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Recorder {
        fn new(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
                log,
            })
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Sink for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn handle(&self, event: &Event) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(event.kind().name().to_owned());
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl Sink for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn handle(&self, _event: &Event) -> Result<(), SinkError> {
            Err(SinkError::failed("disk full"))
        }
    }

    struct Panicking;

    impl Sink for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn handle(&self, _event: &Event) -> Result<(), SinkError> {
            panic!("boom")
        }
    }

    fn sample() -> Event {
        Event::Sample(Reading {
            source_id: "lab/humidity".into(),
            quantity: Quantity::Humidity,
            value: 0.5,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
        })
    }

    #[test]
    fn routes_by_kind_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Recorder::new("first", Arc::clone(&log));
        let second = Recorder::new("second", Arc::clone(&log));
        let averages_only = Recorder::new("avg", Arc::clone(&log));

        let dispatcher = Dispatcher::new();
        dispatcher.subscribe(EventKind::Sample, first.clone());
        dispatcher.subscribe(EventKind::Average, averages_only.clone());
        dispatcher.subscribe(EventKind::Sample, second.clone());

        let report = dispatcher.publish(&sample());
        assert_eq!(report, Delivery { delivered: 2, failed: 0 });
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(averages_only.count(), 0);
    }

    #[test]
    fn failures_do_not_stop_delivery() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let after = Recorder::new("after", Arc::clone(&log));

        let dispatcher = Dispatcher::new();
        dispatcher.subscribe(EventKind::Sample, Arc::new(Failing));
        dispatcher.subscribe(EventKind::Sample, Arc::new(Panicking));
        dispatcher.subscribe(EventKind::Sample, after.clone());

        let report = dispatcher.publish(&sample());
        assert_eq!(report, Delivery { delivered: 1, failed: 2 });
        assert_eq!(after.count(), 1);
    }

    #[test]
    fn subscribe_all_covers_every_kind() {
        let dispatcher = Dispatcher::new();
        dispatcher.subscribe_all(Arc::new(Failing));
        for kind in EventKind::ALL {
            assert_eq!(dispatcher.subscriber_count(kind), 1);
        }
    }

    #[test]
    fn queued_sink_drains_on_shutdown() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner = Recorder::new("inner", Arc::clone(&log));
        let queued = QueuedSink::spawn(inner.clone()).unwrap();

        for _ in 0..50 {
            queued.handle(&sample()).unwrap();
        }
        queued.shutdown();

        assert_eq!(inner.count(), 50);
        assert_eq!(queued.handle(&sample()), Err(SinkError::Closed));
    }
}
