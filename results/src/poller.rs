//! Periodic live-results polling.

use crate::chart::{chart_for, PieChart};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use votekit_client::{ElectionApi, ResultsSnapshot};
use votekit_types::{ElectionId, QuestionId, Timestamp};

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest interval a poller will run at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The latest successful poll, as published to subscribers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveResults {
    pub snapshot: ResultsSnapshot,
    pub chart: PieChart,
    /// Number of successful polls so far.
    pub polls: u64,
    pub updated_at: Option<Timestamp>,
    /// Why the most recent poll failed. Cleared by the next success.
    pub last_error: Option<String>,
}

/// Which question to poll, and how often.
#[derive(Clone, Debug)]
pub struct PollTarget {
    pub election: ElectionId,
    /// `None` charts the ballot's first question.
    pub question: Option<QuestionId>,
    pub interval: Duration,
}

impl PollTarget {
    pub fn new(election: ElectionId) -> Self {
        Self {
            election,
            question: None,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn question(mut self, question: QuestionId) -> Self {
        self.question = Some(question);
        self
    }

    /// Clamped to [`MIN_POLL_INTERVAL`].
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }
}

struct RefreshSignal {
    requested: AtomicBool,
    notify: Notify,
}

/// Handle to a running poll task.
///
/// The task lives exactly as long as this handle: [`stop`](Self::stop) or
/// dropping the handle aborts it, timer included.
pub struct LivePoller {
    results: watch::Receiver<LiveResults>,
    refresh: Arc<RefreshSignal>,
    task: JoinHandle<()>,
}

impl LivePoller {
    /// Poll immediately, then every `target.interval` (never faster than
    /// [`MIN_POLL_INTERVAL`]).
    pub fn spawn<A>(api: Arc<A>, target: PollTarget) -> Self
    where
        A: ElectionApi + 'static,
    {
        let (tx, results) = watch::channel(LiveResults::default());
        let refresh = Arc::new(RefreshSignal {
            requested: AtomicBool::new(false),
            notify: Notify::new(),
        });

        let signal = Arc::clone(&refresh);
        let period = target.interval.max(MIN_POLL_INTERVAL);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = signal.notify.notified() => {
                        interval.reset();
                    }
                }
                poll_once(api.as_ref(), &target, &tx).await;
                // Requests made while the poll was in flight were served by it.
                signal.requested.store(false, Ordering::SeqCst);
            }
        });

        tracing::debug!(interval = ?period, "live results poller started");
        Self {
            results,
            refresh,
            task,
        }
    }

    /// Ask for a poll now. A request made while one is already waiting or in
    /// flight is folded into it.
    ///
    /// Returns `false` when the request was coalesced.
    pub fn refresh(&self) -> bool {
        if self.refresh.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.refresh.notify.notify_one();
        true
    }

    pub fn latest(&self) -> LiveResults {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveResults> {
        self.results.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Abort the poll task. Equivalent to dropping the handle.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("live results poller stopped");
    }
}

async fn poll_once<A: ElectionApi>(api: &A, target: &PollTarget, tx: &watch::Sender<LiveResults>) {
    let charted = api
        .live_results(&target.election, target.question.as_ref())
        .await
        .map_err(|e| e.user_message())
        .and_then(|snapshot| {
            chart_for(&snapshot, target.question.as_ref())
                .map(|chart| (snapshot, chart))
                .map_err(|e| e.to_string())
        });

    match charted {
        Ok((snapshot, chart)) => {
            tx.send_modify(|current| {
                current.polls += 1;
                current.chart = chart;
                current.snapshot = snapshot;
                current.updated_at = Some(Timestamp::now());
                current.last_error = None;
            });
        }
        Err(message) => {
            tracing::warn!(election = %target.election, error = %message, "live results poll failed");
            tx.send_modify(|current| current.last_error = Some(message));
        }
    }
}
